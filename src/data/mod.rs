//! Data acquisition: credentials, HTTP transport, the FRED client, and
//! date alignment of the fetched series.

pub mod credentials;
pub mod fred;
pub mod merge;
pub mod transport;

pub use credentials::{ApiKey, CredentialSource, EnvCredentials, SqliteCredentials, StaticCredentials};
pub use fred::FredClient;
pub use merge::{merge, merge_labeled};
pub use transport::{HttpTransport, RawResponse, ReqwestTransport};
