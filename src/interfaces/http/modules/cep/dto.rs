use serde::Deserialize;
use utoipa::IntoParams;

/// `GET /api/cep?cep=1001000`
#[derive(Debug, Deserialize, IntoParams)]
pub struct CepQuery {
    /// Postal code as a number; leading zeros may be dropped
    pub cep: i64,
}
