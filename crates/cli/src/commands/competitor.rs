//! Competitor link commands.

use shop_insights_core::BrandId;
use shop_insights_server::db::{BrandRepository, CompetitorRepository};

use super::{CommandError, connect};

/// Link `competitor` as a competitor of `brand`.
pub async fn add(brand: BrandId, competitor: BrandId) -> Result<(), CommandError> {
    if brand == competitor {
        return Err(CommandError::Invalid(
            "A brand cannot be its own competitor".to_string(),
        ));
    }

    let state = connect().await?;
    let brands = BrandRepository::new(state.pool());
    for id in [brand, competitor] {
        if !brands.exists(id).await? {
            return Err(CommandError::Invalid(format!("Brand {id} not found")));
        }
    }

    if CompetitorRepository::new(state.pool())
        .add(brand, competitor)
        .await?
    {
        tracing::info!(%brand, %competitor, "Competitor linked");
    } else {
        tracing::info!(%brand, %competitor, "Competitor was already linked");
    }
    Ok(())
}

/// Remove a competitor link.
pub async fn remove(brand: BrandId, competitor: BrandId) -> Result<(), CommandError> {
    let state = connect().await?;
    if CompetitorRepository::new(state.pool())
        .remove(brand, competitor)
        .await?
    {
        tracing::info!(%brand, %competitor, "Competitor unlinked");
        Ok(())
    } else {
        Err(CommandError::Invalid(format!(
            "Brand {brand} has no competitor {competitor}"
        )))
    }
}
