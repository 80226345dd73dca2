use quarry_core::stmt::Value;

/// A rendered statement ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}
