//! `courier classify <message>` – show how a raw transport error is treated.

use courier_core::retry::{self, Failure};

pub fn run_classify(message: &str) {
    let failure = Failure::raw(message.to_string());
    let retryable = retry::is_retryable(&failure);
    let err = retry::classify(failure, None);
    println!("category:  {}", err.category());
    println!("message:   {}", err.message());
    println!("retryable: {}", retryable);
}
