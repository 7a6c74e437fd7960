mod cards;

pub use cards::{CardDatabase, CardInfo, CardTable, CardTableError, SecretKind};
