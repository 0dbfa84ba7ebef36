pub mod chat;
pub mod study;
pub mod upload;

pub use chat::{ChatRequest, ChatResponse};
pub use study::{
    GenerateRequest, GenerateResponse, NotesRequest, NotesResponse, QuizQuestionDto, QuizRequest,
    QuizResponse,
};
pub use upload::{FileInfo, UploadResponse};
