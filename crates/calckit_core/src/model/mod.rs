mod request;
mod result;

pub use request::{CalculationRequest, OutputFormat, ParamValue, Params, split_list};
pub use result::{CalculationResult, Outputs, ResultValue, Table, round_to};
