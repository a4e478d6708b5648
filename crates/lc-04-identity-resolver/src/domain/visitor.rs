//! What is known about the visitor when a request is composed.

use shared_types::RetrievedIdentifier;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisitorState {
    pub durable_id: Option<String>,
    /// US privacy string (CCPA).
    pub us_privacy: Option<String>,
    /// `None` when it is unknown whether GDPR applies.
    pub gdpr_applies: Option<bool>,
    pub gdpr_consent: Option<String>,
    /// No third-party cookies may be used or requested.
    pub privacy_mode: bool,
    pub retrieved_identifiers: Vec<RetrievedIdentifier>,
}

impl VisitorState {
    pub fn with_durable_id(mut self, durable_id: impl Into<String>) -> Self {
        self.durable_id = Some(durable_id.into());
        self
    }

    pub fn with_us_privacy(mut self, us_privacy: impl Into<String>) -> Self {
        self.us_privacy = Some(us_privacy.into());
        self
    }

    pub fn with_gdpr(mut self, applies: bool, consent: Option<String>) -> Self {
        self.gdpr_applies = Some(applies);
        self.gdpr_consent = consent;
        self
    }

    pub fn with_privacy_mode(mut self, privacy_mode: bool) -> Self {
        self.privacy_mode = privacy_mode;
        self
    }

    pub fn with_identifiers(mut self, identifiers: Vec<RetrievedIdentifier>) -> Self {
        self.retrieved_identifiers = identifiers;
        self
    }
}
