use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Invalid object reference: {0}")]
    InvalidReference(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Font error: {0}")]
    FontError(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid object reference: {0} {1} R")]
    InvalidObjectReference(u32, u16),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid page number: {0}")]
    InvalidPageNumber(u32),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid header")]
    InvalidHeader,

    #[error("Content stream too large: {0} bytes")]
    ContentStreamTooLarge(usize),

    #[error("Operation cancelled")]
    OperationCancelled,

    #[error("Encryption error: {0}")]
    EncryptionError(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Duplicate field: {0}")]
    DuplicateField(String),

    #[error("Field not found: {0}")]
    FieldNotFound(String),

    #[error("External validation error: {0}")]
    ExternalValidationError(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;

impl From<crate::parser::ParseError> for PdfError {
    fn from(err: crate::parser::ParseError) -> Self {
        PdfError::ParseError(err.to_string())
    }
}

/// Error taxonomy for the OCR pipeline entry point (`options`, `pdf_info`,
/// `classifier`, `pipeline`, `external`, `assembler`, `optimizer`,
/// `validator`, `job`). Kept separate from [`PdfError`], which remains the
/// error type of the underlying PDF read/write library those modules sit on.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("bad arguments: {0}")]
    BadArgs(String),

    #[error("input file error: {0}")]
    InputFile(String),

    #[error("output file access error: {0}")]
    OutputFileAccess(String),

    #[error("missing dependency: {0}")]
    MissingDependency(String),

    #[error("input PDF is encrypted")]
    EncryptedPdf,

    #[error("page already contains an OCR text layer")]
    PriorOcrFound,

    #[error("DPI error: {0}")]
    DpiError(String),

    #[error("unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("subprocess '{tool}' exited with {code:?}: {stderr}")]
    SubprocessOutput {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("OCR engine configuration error: {0}")]
    OcrConfig(String),

    #[error("PDF merge failed: {0}")]
    PdfMergeFailed(String),

    #[error("metadata error: {0}")]
    Metadata(String),

    #[error("PDF/A conversion failed: {0}")]
    PdfAConversionFailed(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal invariant breached: {0}")]
    Internal(String),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Maps to the stable process exit codes from the CLI contract.
    pub fn exit_code(&self) -> i32 {
        match self {
            CoreError::BadArgs(_) => 1,
            CoreError::InputFile(_) => 2,
            CoreError::MissingDependency(_) => 3,
            CoreError::OutputFileAccess(_) => 5,
            CoreError::PriorOcrFound => 6,
            CoreError::SubprocessOutput { .. } => 7,
            CoreError::EncryptedPdf => 8,
            CoreError::DpiError(_) | CoreError::OcrConfig(_) => 9,
            CoreError::PdfAConversionFailed(_) => 10,
            CoreError::Cancelled => 130,
            CoreError::UnsupportedImageFormat(_)
            | CoreError::PdfMergeFailed(_)
            | CoreError::Metadata(_)
            | CoreError::Internal(_)
            | CoreError::Pdf(_)
            | CoreError::Io(_) => 15,
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;

// Legacy error type kept for backward compatibility with early call sites
#[derive(Error, Debug)]
pub enum OxidizePdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid PDF structure: {0}")]
    InvalidStructure(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Other error: {0}")]
    Other(String),
}
