//! Frame loop integration tests
//!
//! Drive a whole [`Engine`](crate::Engine) against the recording backend and
//! scripted window surfaces.

mod frame_loop;
