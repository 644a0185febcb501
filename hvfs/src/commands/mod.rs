pub mod add;
pub mod create;
pub mod extract;
pub mod list;
pub mod remove;
pub mod rename;
pub mod update;
pub mod validate;

pub use add::run as add;
pub use create::run as create;
pub use extract::run as extract;
pub use list::run as list;
pub use remove::run as remove;
pub use rename::run as rename;
pub use update::run as update;
pub use validate::run as validate;
