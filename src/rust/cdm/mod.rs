//! CDMv2 serialization: footer validation and the output envelope.

mod envelope;
mod footer;
mod serializer;

pub use envelope::{Envelope, NlpOutput, RecordMetadata, ServiceInfo};
pub use footer::{Footer, FooterInput, MissingMetadataError};
pub use serializer::CdmSerializer;
