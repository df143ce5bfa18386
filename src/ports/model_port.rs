//! Prediction model storage port.

use crate::domain::error::StocklensError;
use crate::domain::model::LinearModel;

pub trait ModelPort {
    fn load(&self, symbol: &str) -> Result<LinearModel, StocklensError>;

    fn save(&self, model: &LinearModel) -> Result<(), StocklensError>;
}
