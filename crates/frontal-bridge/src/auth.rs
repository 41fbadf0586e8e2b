/// A signed-in account as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Provider-assigned unique id. Used as the owner of progress records.
    pub id: String,
    pub email: String,
}
