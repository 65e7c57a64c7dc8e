use crate::MAX_PRODUCTS;
use crate::RecentlyViewedStore;
use crate::Result;
use crate::push_front;
use serde::Deserialize;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Persists the list as `{"products": [..]}` at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ViewedProducts {
    #[serde(default)]
    products: Vec<String>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<ViewedProducts> {
        match fs::read(&self.path) {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ViewedProducts::default()),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, viewed: &ViewedProducts) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(viewed)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

impl RecentlyViewedStore for JsonFileStore {
    fn products(&self) -> Result<Vec<String>> {
        let mut products = self.read()?.products;
        products.truncate(MAX_PRODUCTS);
        Ok(products)
    }

    fn record(&self, product_id: &str) -> Result<()> {
        let mut viewed = self.read()?;
        push_front(&mut viewed.products, product_id, MAX_PRODUCTS);
        self.write(&viewed)
    }

    fn clear(&self) -> Result<()> {
        debug!(path = %self.path.display(), "clearing recently viewed products");
        self.write(&ViewedProducts::default())
    }
}
