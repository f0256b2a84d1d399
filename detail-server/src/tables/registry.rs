use shared::AppResult;
use shared::models::TableName;

use super::topo::topo_sort;

/// One exportable table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub name: TableName,
    /// Upsert conflict column, also the rollback delete key
    pub conflict_key: &'static str,
    /// Tables whose rows this table references
    pub depends_on: Vec<TableName>,
    /// Export-only tables are dumped but never replayed
    pub restorable: bool,
}

impl TableSpec {
    pub fn new(name: TableName, depends_on: &[TableName]) -> Self {
        Self {
            name,
            conflict_key: name.conflict_key(),
            depends_on: depends_on.to_vec(),
            restorable: true,
        }
    }

    pub fn export_only(name: TableName) -> Self {
        Self {
            restorable: false,
            ..Self::new(name, &[])
        }
    }
}

/// The back-office's table declarations, in export order
pub fn standard_specs() -> Vec<TableSpec> {
    use TableName::*;
    vec![
        TableSpec::new(Users, &[]),
        TableSpec::new(Customers, &[]),
        TableSpec::new(VehicleTypes, &[]),
        TableSpec::new(Packages, &[VehicleTypes]),
        TableSpec::new(AddOns, &[Packages]),
        TableSpec::new(Inventory, &[]),
        TableSpec::new(Bookings, &[Customers, VehicleTypes, Packages, AddOns]),
        TableSpec::new(Invoices, &[Customers, Bookings]),
        TableSpec::new(Expenses, &[Users]),
        TableSpec::new(InventoryUsage, &[Inventory, Bookings]),
        TableSpec::new(InventoryRecords, &[Inventory, Users]),
        TableSpec::export_only(Coupons),
        TableSpec::export_only(Services),
        TableSpec::export_only(Todos),
        TableSpec::export_only(ContactMessages),
    ]
}

/// Table declarations plus the restore order computed from them
#[derive(Debug, Clone)]
pub struct TableRegistry {
    specs: Vec<TableSpec>,
    restore_order: Vec<TableName>,
}

impl TableRegistry {
    /// Validate the declarations and compute the restore order.
    ///
    /// Fails on a dependency cycle or a dependency on an undeclared table.
    pub fn new(specs: Vec<TableSpec>) -> AppResult<Self> {
        let sorted = topo_sort(&specs)?;
        let restore_order = sorted
            .into_iter()
            .filter(|name| specs.iter().any(|s| s.name == *name && s.restorable))
            .collect();
        Ok(Self {
            specs,
            restore_order,
        })
    }

    pub fn standard() -> AppResult<Self> {
        Self::new(standard_specs())
    }

    /// All tables, in declaration (export) order
    pub fn specs(&self) -> &[TableSpec] {
        &self.specs
    }

    /// Restorable tables, parents before children
    pub fn restore_order(&self) -> &[TableName] {
        &self.restore_order
    }

    pub fn spec(&self, name: TableName) -> Option<&TableSpec> {
        self.specs.iter().find(|s| s.name == name)
    }
}
