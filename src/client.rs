//! Client facade: construction options, default-config profiles, and the typed verb API.
//!
//! A [`RestClient`] is built from validated [`ClientOptions`]. At construction the configure hook
//! (or [`default_configure`]) registers interceptors on the client's private pipeline. Each verb
//! then merges configs as `options defaults < profile defaults < call config`, builds a
//! [`RequestContext`](crate::request::RequestContext), and drives it through the pipeline and
//! transport before decoding the body.

pub mod options;
pub mod profile;
pub mod rest;

pub use options::*;
pub use profile::*;
pub use rest::*;
