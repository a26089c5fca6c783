// State management module.
// Handles navigation, paging, search and form state for the views.

pub mod form;
pub mod lists;
pub mod navigation;
pub mod notify;
pub mod pagination;
pub mod search;

pub use form::{FormField, FormMode, PostForm};
pub use lists::{PagedList, QueryState, Selection};
pub use navigation::{BreadcrumbNode, NavigationStack, ViewLevel};
pub use notify::{ActivityLog, Notification, NotificationLevel};
pub use pagination::{Page, PageRequest};
pub use search::SearchInput;
