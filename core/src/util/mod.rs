mod capture_buffer;

pub use capture_buffer::CaptureBuffer;
