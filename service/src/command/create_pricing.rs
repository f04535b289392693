//! [`Command`] for creating a new [`Pricing`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::pricing::Name;
use crate::{
    domain::{pricing, Pricing},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Pricing`] rule-set snapshot.
///
/// The draft arrives fully formed: rule-sets are immutable once created, a
/// change means a new snapshot with a fresh validity window.
#[derive(Clone, Debug, From)]
pub struct CreatePricing {
    /// [`Pricing`] to create.
    pub pricing: Pricing,
}

impl<Db> Command<CreatePricing> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Pricing>, ()>>,
            Ok = Vec<Pricing>,
            Err = Traced<database::Error>,
        > + Database<Insert<Pricing>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Pricing;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreatePricing,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreatePricing { pricing } = cmd;

        let existing = self
            .database()
            .execute(Select(By::<Vec<Pricing>, _>::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if existing.iter().any(|p| p.name == pricing.name) {
            return Err(tracerr::new!(E::NameOccupied(pricing.name)));
        }

        self.database()
            .execute(Insert(pricing.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(pricing)
    }
}

/// Error of [`CreatePricing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Name`] is already occupied by another [`Pricing`].
    #[display("`{_0}` pricing name is occupied")]
    #[from(ignore)]
    NameOccupied(#[error(not(source))] pricing::Name),
}
