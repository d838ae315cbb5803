pub mod analysis;
pub mod assumptions;
pub mod cash_flows;
pub mod chart;
pub mod discounting;
pub mod payback;
pub mod sensitivity;
pub mod yearly;
