//! Service Layer - the probe itself.

pub mod resolver;

pub use resolver::{resolve_apex_domain, ApexDomainResolver, APEX_DOMAIN_CACHE_KEY};
