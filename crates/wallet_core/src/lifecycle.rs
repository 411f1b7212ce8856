/// Something that holds background work or subscriptions which the owner must
/// release explicitly when it is done with it.
///
/// Implementations must make `clear` idempotent.
pub trait Clearable {
    fn clear(&self);
}
