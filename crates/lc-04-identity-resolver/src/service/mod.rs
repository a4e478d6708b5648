//! Service Layer - identity resolution.

pub mod resolver;

pub use resolver::{
    IdentityResolver, IdentityResolverBuilder, IDENTITY_RESOLVER_ERROR,
    IDENTITY_RESOLVER_PARSER_ERROR,
};
