use thiserror::Error;

/// Hard errors surfaced by the engine. Malformed rule data never lands
/// here: a bad rule degrades to "condition not met" or a zero amount so
/// one misconfigured record cannot block the rest of the pass. Only a
/// missing cart snapshot has no sensible fallback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no cart snapshot was supplied for discount evaluation")]
    MissingCart,
}
