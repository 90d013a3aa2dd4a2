//! Medicine catalog
//!
//! Browsing is open to every identity; catalog changes are staff only.

use shared::{Medicine, MedicineRequest};

use super::Caller;
use crate::error::ClientResult;
use crate::http::{HttpClient, RequestContext};

pub struct MedicineService<'a, H: HttpClient> {
    http: &'a H,
    caller: Caller,
}

impl<'a, H: HttpClient> MedicineService<'a, H> {
    pub fn new(http: &'a H, caller: Caller) -> Self {
        Self { http, caller }
    }

    pub async fn list(&self) -> ClientResult<Vec<Medicine>> {
        let ctx = RequestContext::new(self.caller.token(), "Failed to fetch medicines");
        let medicines: Option<Vec<Medicine>> = self.http.get("medicines", ctx).await?;
        Ok(medicines.unwrap_or_default())
    }

    pub async fn get(&self, id: i64) -> ClientResult<Medicine> {
        let ctx = RequestContext::new(self.caller.token(), "Failed to fetch medicine");
        self.http.get(&format!("medicines/{id}"), ctx).await
    }

    /// Medicines whose name contains `query` (case-insensitive)
    pub async fn search(&self, query: &str) -> ClientResult<Vec<Medicine>> {
        let needle = query.trim().to_lowercase();
        let mut medicines = self.list().await?;
        medicines.retain(|m| m.name.to_lowercase().contains(&needle));
        Ok(medicines)
    }

    pub async fn create(&self, request: &MedicineRequest) -> ClientResult<Medicine> {
        let token = self.caller.require_staff("create medicine")?;
        let ctx = RequestContext::new(Some(token), "Failed to create medicine");
        let medicine: Medicine = self.http.post("medicines", ctx, request).await?;
        tracing::info!(medicine_id = medicine.id, name = %medicine.name, "Medicine created");
        Ok(medicine)
    }

    pub async fn update(&self, id: i64, request: &MedicineRequest) -> ClientResult<Medicine> {
        let token = self.caller.require_staff("update medicine")?;
        let ctx = RequestContext::new(Some(token), "Failed to update medicine");
        let medicine: Medicine = self.http.put(&format!("medicines/{id}"), ctx, request).await?;
        tracing::info!(medicine_id = id, "Medicine updated");
        Ok(medicine)
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        let token = self.caller.require_staff("delete medicine")?;
        let ctx = RequestContext::new(Some(token), "Failed to delete medicine");
        let _: Option<serde_json::Value> = self.http.delete(&format!("medicines/{id}"), ctx).await?;
        tracing::info!(medicine_id = id, "Medicine deleted");
        Ok(())
    }
}
