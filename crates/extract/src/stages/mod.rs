mod ocr;
mod pdf_layer;
mod plain;
mod remote;

pub use ocr::OcrStage;
pub use pdf_layer::PdfTextLayerStage;
pub use plain::PlainTextStage;
pub use remote::DocumentServiceStage;
