//! One service per resource family. Services borrow the shared
//! [`HarvestClient`](crate::HarvestClient) and hold no state of their own.

pub mod clients;
pub mod company;
pub mod estimates;
pub mod expenses;
pub mod invoices;
pub mod projects;
pub mod roles;
pub mod tasks;
pub mod timesheets;
pub mod users;

pub use clients::ClientsService;
pub use company::CompanyService;
pub use estimates::EstimatesService;
pub use expenses::ExpensesService;
pub use invoices::InvoicesService;
pub use projects::ProjectsService;
pub use roles::RolesService;
pub use tasks::TasksService;
pub use timesheets::TimesheetsService;
pub use users::UsersService;
