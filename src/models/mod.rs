pub mod model;

pub use model::{PredictError, PriceModel, Scaler, predict_price};
