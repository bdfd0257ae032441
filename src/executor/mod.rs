//! Remote evaluation against the cluster router.
//!
//! Requests travel as `tarantool -e <chunk>` through the container runtime,
//! so the harness needs no network route into the container. Replies come
//! back as YAML on stdout; failures are told apart by exit code.

mod decode;
mod remote_executor;
mod template;
pub use decode::*;
pub use remote_executor::*;
pub use template::Credentials;
pub use template::Endpoint;
pub use template::escape_lua;
pub(crate) use template::render_request;
pub(crate) use template::ExitCodes;
