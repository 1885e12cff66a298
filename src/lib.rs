pub mod cache;
pub mod config;
pub mod exception;
pub mod folder;
pub mod json;
pub mod param;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod table;
pub mod uri;
pub mod util;

pub use config::Config;
pub use exception::Exception;
pub use folder::Folder;
pub use param::{ContentType, HttpRequestMethod, Status};
pub use request::Request;
pub use response::Response;
pub use router::{Location, VirtualFolder};
pub use table::Table;
