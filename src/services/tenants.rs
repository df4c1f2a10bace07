use sea_orm::{ConnectionTrait, EntityTrait, QuerySelect};
use uuid::Uuid;

use crate::entities::tenant::{self, Entity as Tenant};
use crate::errors::ServiceError;

/// Loads a tenant and rejects deactivated ones. Every mutating operation in
/// the order core goes through this before touching tenant data.
pub async fn find_active<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
) -> Result<tenant::Model, ServiceError> {
    let tenant = Tenant::find_by_id(tenant_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Tenant {} not found", tenant_id)))?;

    check_active(tenant)
}

/// Like [`find_active`] but takes a `SELECT ... FOR UPDATE` lock on the
/// tenant row. The creation paths use this so per-tenant document numbering
/// (order and ticket numbers) serializes across concurrent transactions.
pub async fn find_active_for_update<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
) -> Result<tenant::Model, ServiceError> {
    let tenant = Tenant::find_by_id(tenant_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Tenant {} not found", tenant_id)))?;

    check_active(tenant)
}

fn check_active(tenant: tenant::Model) -> Result<tenant::Model, ServiceError> {
    if !tenant.is_active {
        return Err(ServiceError::InactiveTenant(tenant.id));
    }
    Ok(tenant)
}
