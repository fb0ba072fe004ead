//! Domain models for the admin API.
//!
//! Row types derive `sqlx::FromRow` and serialize in camelCase. Request
//! bodies are plain `Deserialize` structs; the ones with rules expose a
//! `validate` that returns the normalized value to store.

pub mod admin_user;
pub mod category;
pub mod customer;
pub mod dashboard;
pub mod finance;
pub mod gift;
pub mod inventory;
pub mod marketing;
pub mod notification;
pub mod order;
pub mod pagination;
pub mod platform;
pub mod product;
pub mod report;
pub mod review;
pub mod seller;
pub mod session;
pub mod settings;
pub mod shipping;
pub mod support;
pub mod template;
pub mod validation;
pub mod warehouse;

pub use admin_user::{AdminRole, AdminUser};
pub use category::{Category, CategoryInput, NewCategory};
pub use customer::{Customer, CustomerListQuery, CustomerSummary};
pub use dashboard::{ActivityKind, DashboardStats, MonthlyRevenue, RecentActivity};
pub use pagination::{PageInfo, Paged, Pagination};
pub use session::CurrentAdmin;
pub use session::keys as session_keys;
pub use validation::ValidationError;
