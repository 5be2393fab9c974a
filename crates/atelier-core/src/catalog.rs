//! Ateliers and products known to the engine, and who owns them.
//!
//! The photo engine does not manage products; it only needs to resolve a
//! product to its atelier and an atelier to its owner. `Catalog` is the
//! in-process table the CLI persists as `catalog.json`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::registry::Ownership;
use crate::types::{AtelierId, AtelierRef, ProductId, ProductRef, UserId};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    ateliers: Vec<AtelierRef>,
    #[serde(default)]
    products: Vec<ProductRef>,
    #[serde(skip)]
    atelier_index: BTreeMap<AtelierId, usize>,
    #[serde(skip)]
    product_index: BTreeMap<ProductId, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON, rebuilding the lookup indexes.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut catalog: Catalog = serde_json::from_str(json)?;
        catalog.reindex();
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn reindex(&mut self) {
        self.atelier_index = self
            .ateliers
            .iter()
            .enumerate()
            .map(|(i, a)| (a.id, i))
            .collect();
        self.product_index = self
            .products
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
    }

    /// Register an atelier, replacing any previous owner.
    pub fn add_atelier(&mut self, id: AtelierId, user_id: UserId) -> AtelierRef {
        let atelier = AtelierRef { id, user_id };
        match self.atelier_index.get(&id) {
            Some(&i) => self.ateliers[i] = atelier,
            None => {
                self.atelier_index.insert(id, self.ateliers.len());
                self.ateliers.push(atelier);
            }
        }
        atelier
    }

    /// Register a product under an existing atelier.
    pub fn add_product(
        &mut self,
        id: ProductId,
        atelier_id: AtelierId,
    ) -> Result<ProductRef, RegistryError> {
        if !self.atelier_index.contains_key(&atelier_id) {
            return Err(RegistryError::AtelierNotFound(atelier_id));
        }
        let product = ProductRef { id, atelier_id };
        match self.product_index.get(&id) {
            Some(&i) => self.products[i] = product,
            None => {
                self.product_index.insert(id, self.products.len());
                self.products.push(product);
            }
        }
        Ok(product)
    }

    pub fn atelier(&self, id: AtelierId) -> Result<AtelierRef, RegistryError> {
        self.atelier_index
            .get(&id)
            .map(|&i| self.ateliers[i])
            .ok_or(RegistryError::AtelierNotFound(id))
    }

    pub fn product(&self, id: ProductId) -> Result<ProductRef, RegistryError> {
        self.product_index
            .get(&id)
            .map(|&i| self.products[i])
            .ok_or(RegistryError::ProductNotFound(id))
    }

    pub fn ateliers(&self) -> &[AtelierRef] {
        &self.ateliers
    }

    pub fn products(&self) -> &[ProductRef] {
        &self.products
    }
}

impl Ownership for Catalog {
    fn product_atelier(&self, product: ProductId) -> Option<AtelierId> {
        self.product(product).ok().map(|p| p.atelier_id)
    }

    fn atelier_owner(&self, atelier: AtelierId) -> Option<UserId> {
        self.atelier(atelier).ok().map(|a| a.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add_atelier(AtelierId(1), UserId(10));
        catalog.add_atelier(AtelierId(2), UserId(20));
        catalog.add_product(ProductId(100), AtelierId(1)).unwrap();
        catalog.add_product(ProductId(200), AtelierId(2)).unwrap();
        catalog
    }

    #[test]
    fn test_ownership_follows_atelier() {
        let catalog = catalog();
        assert_eq!(catalog.product_owner(ProductId(100)), Some(UserId(10)));
        assert_eq!(catalog.product_owner(ProductId(200)), Some(UserId(20)));
        assert_eq!(catalog.product_owner(ProductId(300)), None);
        assert_eq!(catalog.atelier_owner(AtelierId(2)), Some(UserId(20)));
    }

    #[test]
    fn test_product_atelier() {
        let catalog = catalog();
        assert_eq!(catalog.product_atelier(ProductId(200)), Some(AtelierId(2)));
        assert_eq!(catalog.product_atelier(ProductId(300)), None);
    }

    #[test]
    fn test_product_requires_atelier() {
        let mut catalog = catalog();
        let err = catalog.add_product(ProductId(5), AtelierId(9)).unwrap_err();
        assert!(matches!(err, RegistryError::AtelierNotFound(AtelierId(9))));
    }

    #[test]
    fn test_reassigning_atelier_owner() {
        let mut catalog = catalog();
        catalog.add_atelier(AtelierId(1), UserId(11));
        assert_eq!(catalog.ateliers().len(), 2);
        assert_eq!(catalog.product_owner(ProductId(100)), Some(UserId(11)));
    }

    #[test]
    fn test_json_round_trip_rebuilds_index() {
        let json = catalog().to_json().unwrap();
        let loaded = Catalog::from_json(&json).unwrap();
        assert_eq!(loaded.product(ProductId(200)).unwrap().atelier_id, AtelierId(2));
        assert!(loaded.product(ProductId(999)).is_err());
    }

    #[test]
    fn test_empty_json_object() {
        let loaded = Catalog::from_json("{}").unwrap();
        assert!(loaded.products().is_empty());
    }
}
