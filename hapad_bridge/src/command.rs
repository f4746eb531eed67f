//! Interactive key commands and the key side channel.
//!
//! Keys arrive asynchronously (stdin reader thread, device keypad) and are
//! consumed at most once per tick by the control loop. The hand-off is a
//! fixed-capacity single-producer/single-consumer queue: the producer never
//! blocks and the consumer never waits.

use heapless::spsc::{Consumer, Producer, Queue};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{debug, warn};

/// Queue storage size. `heapless` keeps one slot free, so 15 keys fit.
pub const KEY_QUEUE_SIZE: usize = 16;

/// One of the three lockable wrist joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WristJoint {
    /// Channel 3.
    J0,
    /// Channel 4.
    J1,
    /// Channel 5.
    J2,
}

impl WristJoint {
    /// All wrist joints in channel order.
    pub const ALL: [Self; 3] = [Self::J0, Self::J1, Self::J2];

    /// Device channel index of this joint.
    pub const fn channel(self) -> usize {
        match self {
            Self::J0 => 3,
            Self::J1 => 4,
            Self::J2 => 5,
        }
    }

    /// Position of this joint inside the wrist torque triple.
    pub const fn wrist_index(self) -> usize {
        match self {
            Self::J0 => 0,
            Self::J1 => 1,
            Self::J2 => 2,
        }
    }
}

/// Decoded interactive command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    /// `q`: leave the loop.
    Quit,
    /// `0` / `1` / `2`: toggle one wrist lock.
    ToggleJoint(WristJoint),
    /// `a`: move every wrist lock to the negation of joint 0's state.
    ToggleAll,
}

impl KeyCommand {
    /// Decode a key press. Unknown keys yield `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            'q' | 'Q' => Some(Self::Quit),
            'a' | 'A' => Some(Self::ToggleAll),
            '0' => Some(Self::ToggleJoint(WristJoint::J0)),
            '1' => Some(Self::ToggleJoint(WristJoint::J1)),
            '2' => Some(Self::ToggleJoint(WristJoint::J2)),
            _ => None,
        }
    }
}

/// Producing half of the key queue.
pub struct KeyProducer(Producer<'static, char, KEY_QUEUE_SIZE>);

/// Consuming half of the key queue.
pub struct KeyConsumer(Consumer<'static, char, KEY_QUEUE_SIZE>);

/// Set once the stdin reader has been handed out.
static STDIN_CLAIMED: AtomicBool = AtomicBool::new(false);

/// Create a connected key producer/consumer pair.
///
/// Each call leaks one queue of [`KEY_QUEUE_SIZE`] slots so both halves can
/// be `'static`. Call it once per key source, not per session; stdin goes
/// through [`stdin_key_source`].
pub fn key_channel() -> (KeyProducer, KeyConsumer) {
    let queue: &'static mut Queue<char, KEY_QUEUE_SIZE> = Box::leak(Box::new(Queue::new()));
    let (producer, consumer) = queue.split();
    (KeyProducer(producer), KeyConsumer(consumer))
}

impl KeyProducer {
    /// Enqueue a key. Returns `false` (and drops the key) if the queue is full.
    pub fn push(&mut self, key: char) -> bool {
        match self.0.enqueue(key) {
            Ok(()) => true,
            Err(dropped) => {
                warn!("Key queue full, dropping {dropped:?}");
                false
            }
        }
    }
}

impl KeyConsumer {
    /// Dequeue the oldest pending key, if any. Never blocks.
    pub fn pop(&mut self) -> Option<char> {
        self.0.dequeue()
    }

    /// Number of pending keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawn a detached thread forwarding stdin characters into `producer`.
///
/// Stdin is line buffered, so keys become visible after Enter. Whitespace is
/// skipped. The thread ends on EOF or read error.
pub fn spawn_stdin_reader(mut producer: KeyProducer) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name("hapad-keys".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                for key in line.chars().filter(|c| !c.is_whitespace()) {
                    producer.push(key);
                }
            }
            debug!("Stdin key reader finished");
        })
}

/// Key source fed from stdin, started on first use.
///
/// Stdin is process-wide, so only the first caller gets the consumer; later
/// calls return `None`. Drivers keep the consumer across close and reopen.
pub fn stdin_key_source() -> Option<KeyConsumer> {
    if !claim(&STDIN_CLAIMED) {
        debug!("Stdin key reader already claimed");
        return None;
    }
    let (producer, consumer) = key_channel();
    match spawn_stdin_reader(producer) {
        Ok(_) => Some(consumer),
        Err(e) => {
            warn!("Could not start stdin key reader: {e}");
            None
        }
    }
}

fn claim(flag: &AtomicBool) -> bool {
    !flag.swap(true, Ordering::AcqRel)
}
