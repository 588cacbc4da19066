pub mod checkout_reader;
pub mod ledger_writer;
