//! Scripted binding for tests
//!
//! Returns preset status codes and records every call so callers can assert
//! on exactly which native operations the supervisor performed.

use std::collections::VecDeque;

use crate::binding::NativeBinding;

/// A native call observed by [`RecordingBinding`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BindingCall {
    IsRunning,
    Start(Vec<String>),
    Stop,
}

/// In-memory binding with scripted results
///
/// `is_running` answers are consumed from a queue; once the queue is empty
/// the last fallback value is repeated.
#[derive(Clone, Debug, Default)]
pub struct RecordingBinding {
    running_answers: VecDeque<i32>,
    running_fallback: i32,
    start_result: i32,
    stop_result: i32,
    calls: Vec<BindingCall>,
}

impl RecordingBinding {
    /// Binding that always reports the given `is_running` value and starts successfully
    pub fn new(is_running: i32) -> Self {
        Self {
            running_fallback: is_running,
            ..Self::default()
        }
    }

    /// Queue `is_running` answers to return before falling back
    pub fn with_running_sequence<I: IntoIterator<Item = i32>>(mut self, answers: I) -> Self {
        self.running_answers.extend(answers);
        self
    }

    /// Status code returned by every `start`
    pub fn with_start_result(mut self, result: i32) -> Self {
        self.start_result = result;
        self
    }

    /// Status code returned by every `stop`
    pub fn with_stop_result(mut self, result: i32) -> Self {
        self.stop_result = result;
        self
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> &[BindingCall] {
        &self.calls
    }

    /// Arguments of every `start` call
    pub fn start_calls(&self) -> Vec<&[String]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                BindingCall::Start(args) => Some(args.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn stop_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BindingCall::Stop))
            .count()
    }

    pub fn is_running_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, BindingCall::IsRunning))
            .count()
    }
}

impl NativeBinding for RecordingBinding {
    fn is_running(&mut self) -> i32 {
        self.calls.push(BindingCall::IsRunning);
        self.running_answers
            .pop_front()
            .unwrap_or(self.running_fallback)
    }

    fn start(&mut self, args: &[String]) -> i32 {
        self.calls.push(BindingCall::Start(args.to_vec()));
        self.start_result
    }

    fn stop(&mut self) -> i32 {
        self.calls.push(BindingCall::Stop);
        self.stop_result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_sequence_then_fallback() {
        let mut binding = RecordingBinding::new(7).with_running_sequence([0, 1]);
        assert_eq!(binding.is_running(), 0);
        assert_eq!(binding.is_running(), 1);
        assert_eq!(binding.is_running(), 7);
        assert_eq!(binding.is_running(), 7);
        assert_eq!(binding.is_running_count(), 4);
    }

    #[test]
    fn test_calls_are_recorded_in_order() {
        let mut binding = RecordingBinding::new(0).with_start_result(1);
        binding.is_running();
        assert_eq!(binding.start(&["a".to_string()]), 1);
        binding.stop();

        assert_eq!(
            binding.calls(),
            &[
                BindingCall::IsRunning,
                BindingCall::Start(vec!["a".to_string()]),
                BindingCall::Stop,
            ]
        );
        assert_eq!(binding.start_calls().len(), 1);
        assert_eq!(binding.stop_count(), 1);
    }
}
