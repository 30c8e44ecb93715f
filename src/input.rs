use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use log::{debug, warn};
use std::collections::HashMap;
use std::io;
use std::time::Duration;

use crate::keyboard::CHIP8_KEY_COUNT;

/// hex keys typed literally: '0' => 0x0 ... 'f' => 0xf
pub const CHIP8_LITERAL_KEYMAP: [(char, u8); 16] = [
    ('0', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('4', 0x04),
    ('5', 0x05),
    ('6', 0x06),
    ('7', 0x07),
    ('8', 0x08),
    ('9', 0x09),
    ('a', 0x0a),
    ('b', 0x0b),
    ('c', 0x0c),
    ('d', 0x0d),
    ('e', 0x0e),
    ('f', 0x0f),
];

/// ditto using left-hand side of qwerty keyboard, laid out like the
/// COSMAC keypad:
///   1 2 3 4      1 2 3 C
///   q w e r  =>  4 5 6 D
///   a s d f      7 8 9 E
///   z x c v      A 0 B F
pub const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// Run-control requests that arrived since they were last taken. These
/// drive the environment, not the program.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    /// flip between running and paused
    pub toggle_pause: bool,
    /// instructions to single-step; only honoured while paused
    pub steps: u32,
    /// reload the program and start it again
    pub reset: bool,
}

/// reads keypresses and turns them into keypad state
pub trait Input {
    /// which of the 16 keys are down right now, bit n == key n
    fn poll_keys(&mut self) -> Result<u16, io::Error>;

    /// has the user asked to leave
    fn quit_requested(&self) -> bool;

    /// run controls seen by the last `poll_keys`, cleared on return
    fn take_controls(&mut self) -> Controls;
}

/// Terminals only report presses, so a pressed key is held down for a
/// fixed number of polls and then released.
struct HeldKeys {
    remaining: [u32; CHIP8_KEY_COUNT as usize],
    hold: u32,
}

impl HeldKeys {
    fn new(hold: u32) -> Self {
        HeldKeys {
            remaining: [0; CHIP8_KEY_COUNT as usize],
            hold: hold.max(1),
        }
    }

    fn press(&mut self, key: u8) {
        self.remaining[key as usize] = self.hold;
    }

    /// current mask, then age every held key by one poll
    fn tick(&mut self) -> u16 {
        let mut mask = 0u16;
        for (key, remaining) in self.remaining.iter_mut().enumerate() {
            if *remaining > 0 {
                mask |= 1 << key;
                *remaining -= 1;
            }
        }
        mask
    }
}

/// Turns terminal key events into keypad presses and run controls.
///
///   Esc, Ctrl-C  quit
///   F5           run / pause
///   F10          single step (while paused)
///   F11          step while held (while paused)
///   F8           reload the program and reset
struct KeyEvents {
    held: HeldKeys,
    keymap: HashMap<char, u8>,
    controls: Controls,
    quit: bool,
}

impl KeyEvents {
    fn new(keymap: &[(char, u8)], hold_polls: u32) -> Self {
        KeyEvents {
            held: HeldKeys::new(hold_polls),
            keymap: keymap.iter().copied().collect(),
            controls: Controls::default(),
            quit: false,
        }
    }

    fn handle(&mut self, evt: KeyEvent) {
        match evt.code {
            // raw mode delivers Ctrl-C as a plain key
            KeyCode::Char('c') if evt.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true
            }
            KeyCode::Char(key) => match self.keymap.get(&key.to_ascii_lowercase()) {
                Some(mapped_key) => self.held.press(*mapped_key),
                None => debug!("can't map {:?} to a COSMAC key", key),
            },
            KeyCode::Esc => self.quit = true,
            KeyCode::F(5) => self.controls.toggle_pause = !self.controls.toggle_pause,
            // held F11 arrives as auto-repeated presses
            KeyCode::F(10) | KeyCode::F(11) => {
                self.controls.steps = self.controls.steps.saturating_add(1)
            }
            KeyCode::F(8) => self.controls.reset = true,
            _ => debug!("unbound key event received: {:?}", evt),
        }
    }
}

/// implementation of Input reading the terminal with crossterm
pub struct StdinInput {
    keys: KeyEvents,
}

impl StdinInput {
    pub fn new(keymap: &[(char, u8)], hold_polls: u32) -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(StdinInput {
            keys: KeyEvents::new(keymap, hold_polls),
        })
    }

    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => self.keys.handle(evt),
                // resizes and mouse events; logged quietly as stderr is the screen
                evt => debug!("unhandled event received: {:?}", evt),
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!("unable to restore terminal: {}", e);
        }
    }
}

impl Input for StdinInput {
    fn poll_keys(&mut self) -> Result<u16, io::Error> {
        self.read_stdin()?;
        Ok(self.keys.held.tick())
    }

    fn quit_requested(&self) -> bool {
        self.keys.quit
    }

    fn take_controls(&mut self) -> Controls {
        std::mem::take(&mut self.keys.controls)
    }
}

/// dummy Input implementation for testing; replays one mask (and one set
/// of controls) per poll and asks to quit when the masks run out
pub struct DummyInput {
    masks: Vec<u16>,
    controls: Vec<Controls>,
    current: Controls,
}

impl DummyInput {
    pub fn new(masks: &[u16]) -> Self {
        let mut masks = Vec::from(masks);
        masks.reverse();
        DummyInput {
            masks,
            controls: Vec::new(),
            current: Controls::default(),
        }
    }

    /// controls to hand out alongside each mask, first poll first
    pub fn with_controls(mut self, controls: &[Controls]) -> Self {
        self.controls = Vec::from(controls);
        self.controls.reverse();
        self
    }
}

impl Input for DummyInput {
    fn poll_keys(&mut self) -> Result<u16, io::Error> {
        self.current = self.controls.pop().unwrap_or_default();
        Ok(self.masks.pop().unwrap_or(0))
    }

    fn quit_requested(&self) -> bool {
        self.masks.is_empty()
    }

    fn take_controls(&mut self) -> Controls {
        std::mem::take(&mut self.current)
    }
}
