use crate::runtime::{
    data_structures::value::Value,
    error::{self, ErrorKind, ScriptError},
};

/// The persistent sequence backing the data stack.  The top of the stack is the back of the
/// vector.
pub type StackItems = im::Vector<Value>;

/// Message reported whenever something tries to take a value off of an empty stack.
pub const UNDERFLOW_MESSAGE: &str =
    "Data stack underflow. Can't take something off an empty data stack.";

/// Report an attempt to take more off of the stack than it holds.
pub fn underflow<T>() -> error::Result<T> {
    ScriptError::new_as_result(ErrorKind::StackUnderflow, None, UNDERFLOW_MESSAGE.to_string())
}

/// The data stack.  Every value that flows between words, quotations and host forms passes through
/// here.
///
/// The contents are held in a persistent vector so that taking a snapshot is cheap and every
/// change is made by swapping in a complete new sequence.  Nothing can observe a half applied
/// update because all changes go through `&mut self`.
#[derive(Clone, Default)]
pub struct Stack {
    items: StackItems,
}

impl Stack {
    pub fn new() -> Stack {
        Stack {
            items: StackItems::new(),
        }
    }

    /// Compute the sequence that would result from pushing the value, without changing the stack.
    pub fn push(&self, value: Value) -> StackItems {
        let mut items = self.items.clone();
        items.push_back(value);

        items
    }

    /// Push the value onto the stack and return the new contents.
    pub fn push_mutable(&mut self, value: Value) -> StackItems {
        let items = self.push(value);
        self.items = items.clone();

        items
    }

    /// Push the result of a host evaluation.  The "no value" sentinel is dropped so that forms
    /// that produce nothing leave the stack alone.
    pub fn conj_it(&mut self, value: Value) {
        if !value.is_stack_void() {
            self.items.push_back(value);
        }
    }

    /// Get a copy of the top value without removing it.
    pub fn peek(&self) -> error::Result<Value> {
        match self.items.last() {
            Some(value) => Ok(value.clone()),
            None => underflow(),
        }
    }

    /// Compute the sequence that would result from popping the stack, without changing it.
    pub fn pop(&self) -> error::Result<StackItems> {
        if self.items.is_empty() {
            return underflow();
        }

        let mut items = self.items.clone();
        let _ = items.pop_back();

        Ok(items)
    }

    /// Remove the top value and return the new contents.
    pub fn pop_mutable(&mut self) -> error::Result<StackItems> {
        let items = self.pop()?;
        self.items = items.clone();

        Ok(items)
    }

    /// Remove the top value and return it.  The value is read and removed in one step.
    pub fn pop_it(&mut self) -> error::Result<Value> {
        self.swap(|items| {
            let mut items = items.clone();

            match items.pop_back() {
                Some(value) => Ok((items, value)),
                None => underflow(),
            }
        })
    }

    /// Replace the contents of the stack with the sequence computed by the update function.  If
    /// the function fails the stack is left exactly as it was.
    pub fn swap<R, F>(&mut self, update: F) -> error::Result<R>
    where
        F: FnOnce(&StackItems) -> error::Result<(StackItems, R)>,
    {
        let (items, result) = update(&self.items)?;
        self.items = items;

        Ok(result)
    }

    /// Take the top `N` values, bottom first, and replace them with the values the update function
    /// returns.  On underflow, or if the function fails, the stack is left exactly as it was.
    pub fn replace_top<const N: usize, R, F>(&mut self, update: F) -> error::Result<R>
    where
        F: FnOnce([Value; N]) -> error::Result<(Vec<Value>, R)>,
    {
        self.swap(|items| {
            if items.len() < N {
                return underflow();
            }

            let mut items = items.clone();
            let top: Vec<Value> = items.split_off(items.len() - N).into_iter().collect();

            let Ok(top) = <[Value; N]>::try_from(top) else {
                return underflow();
            };

            let (replacements, result) = update(top)?;
            items.extend(replacements);

            Ok((items, result))
        })
    }

    pub fn clear(&mut self) {
        self.items = StackItems::new();
    }

    /// Iterate over the stack contents, top of the stack first.
    pub fn seq(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.items.iter().rev()
    }

    pub fn depth(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Capture the current contents, for restoring after a failed evaluation.
    pub fn snapshot(&self) -> StackItems {
        self.items.clone()
    }

    pub fn restore(&mut self, items: StackItems) {
        self.items = items;
    }
}
