use super::loader;
use crate::model::template::Template;
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct DataStore {
    pub templates_by_name: HashMap<String, Template>,
    /// Template names in load order.
    pub names: Vec<String>,
}

static STORE: OnceLock<DataStore> = OnceLock::new();

pub fn get_store() -> &'static DataStore {
    STORE.get_or_init(loader::load_all_templates)
}
