pub mod invoice;

pub use invoice::{Address, FreightPayer, Invoice, LineItem, Party, Totals, Transport};
