//! Boot script repository.
//!
//! An immutable, ordered list of boot-event definitions. A line's identity
//! is its position in the script; the order is fixed and never changes at
//! runtime. Each event's nominal delay is rolled once, at load time, so
//! un-retried lines are deterministic within a run (only the retry-wait
//! interval is re-randomized per attempt).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::timing;

/// How the sequencer presents an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// Appears after its delay, then resolves through the fail/retry machine.
    Normal,
    /// Animated by the progress sub-routine (memory test) with a tone.
    ProgressAnimated,
}

/// Immutable definition of one scripted boot event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootEventDef {
    pub text: String,
    pub kind: LineKind,
    /// Bounds for the randomized nominal delay, in milliseconds.
    pub delay_range: (u64, u64),
    /// Probability in `[0, 1]` that a resolve attempt fails.
    pub fail_chance: f64,
}

impl BootEventDef {
    pub fn normal(text: impl Into<String>, delay_range: (u64, u64), fail_chance: f64) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::Normal,
            delay_range,
            fail_chance,
        }
    }

    pub fn progress(text: impl Into<String>, delay_range: (u64, u64)) -> Self {
        Self {
            text: text.into(),
            kind: LineKind::ProgressAnimated,
            delay_range,
            fail_chance: 0.0,
        }
    }
}

/// A definition plus its load-time nominal delay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedEvent {
    pub def: BootEventDef,
    /// Rolled once from `def.delay_range` when the script is built.
    pub nominal_delay_ms: u64,
}

/// The ordered, immutable boot script.
#[derive(Debug, Clone)]
pub struct BootScript {
    events: Vec<ScriptedEvent>,
}

impl BootScript {
    /// Build a script from definitions, rolling each nominal delay once.
    pub fn from_defs(defs: Vec<BootEventDef>, rng: &mut impl Rng) -> Self {
        let events = defs
            .into_iter()
            .map(|def| {
                let (min, max) = def.delay_range;
                let nominal_delay_ms = timing::delay_between(rng, min, max);
                ScriptedEvent {
                    def,
                    nominal_delay_ms,
                }
            })
            .collect();
        Self { events }
    }

    /// The standard Akiba OS boot script.
    pub fn standard(rng: &mut impl Rng) -> Self {
        Self::from_defs(standard_defs(rng), rng)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScriptedEvent> {
        self.events.get(index)
    }

    pub fn events(&self) -> &[ScriptedEvent] {
        &self.events
    }
}

/// Dotted-quad with random octets, for the fake DHCP lines.
pub fn random_ip(rng: &mut impl Rng) -> String {
    let octets: Vec<String> = (0..4).map(|_| rng.gen_range(0u16..256).to_string()).collect();
    octets.join(".")
}

/// Colon-separated random MAC address.
pub fn random_mac(rng: &mut impl Rng) -> String {
    let bytes: Vec<String> = (0..6).map(|_| format!("{:02x}", rng.gen::<u8>())).collect();
    bytes.join(":")
}

/// Banner drawn above the log before the first line appears.
pub const ASCII_BANNER: &str = r#"
      __       __   ___   __     _______       __              ______    ________
     /""\     |/"| /  ") |" \   |   _  "\     /""\            /    " \  /"       )
    /    \    (: |/   /  ||  |  (. |_)  :)   /    \          // ____  \(:   \___/
   /' /\  \   |    __/   |:  |  |:     \/   /' /\  \        /  /    ) :)\___  \
  //  __'  \  (// _  \   |.  |  (|  _  \\  //  __'  \      (: (____/ //  __/  \\
 /   /  \\  \ |: | \  \  /\  |\ |: |_)  :)/   /  \\  \      \        /  /" \   :)
(___/    \___)(__|  \__)(__\_|_)(_______/(___/    \___)      \"_____/  (_______/
"#;

pub const COPYRIGHT_NOTICE: &str = r#"
Akiba OS v0.1.0

COPYRIGHT (C) 19XX Akiba OS Development Team

All Rights Reserved.

This software is provided "as is" without warranty of any kind.
Use at your own risk.

Welcome to Akiba OS!
"#;

fn standard_defs(rng: &mut impl Rng) -> Vec<BootEventDef> {
    use BootEventDef as E;
    vec![
        E::normal("NeoCore BIOS v2.34 (C) 19XX Akiba NeoCore Division", (50, 150), 0.0),
        E::normal("Performing system integrity check...", (1000, 2000), 0.0),
        E::normal("CPU: Quantum X68 322MHz", (2500, 5000), 0.01),
        E::progress("Memory Test: 16384K", (4000, 8000)),
        E::normal("VesperTech VGA Adapter", (100, 250), 0.05),
        E::normal("  > VESA BIOS v3.0", (50, 150), 0.0),
        E::normal("  > Truecolor, 64M VRAM", (50, 150), 0.02),
        E::normal("PrimeDisk Disk Controller", (150, 350), 0.05),
        E::normal("  > 2 IDE Channels", (50, 150), 0.02),
        E::normal("  > 4 devices detected", (250, 500), 0.05),
        E::normal("    - 2.5GB HDD", (50, 150), 0.05),
        E::normal("    - 1.44MB FDD", (50, 150), 0.05),
        E::normal("    - 32X CD-ROM", (50, 150), 0.05),
        E::normal("    - 100MB ZIP Drive", (50, 150), 0.05),
        E::normal("LunaPort USB Host Controller", (150, 350), 0.05),
        E::normal("  > 2 USB 1.1 ports", (50, 150), 0.02),
        E::normal("NovaSonic Audio Experience Adapter", (100, 250), 0.05),
        E::normal("ZenithNet Ethernet Adapter 10/100", (150, 350), 0.1),
        E::normal("NovaTech NVRAM Controller", (100, 250), 0.05),
        E::normal("  > 128KB NVRAM", (50, 150), 0.02),
        E::normal("  > Battery Status: OK", (50, 150), 0.05),
        E::normal("PX/2 Mouse: Detected", (50, 150), 0.02),
        E::normal("PX/2 Keyboard: Detected", (50, 150), 0.02),
        E::normal("Initializing System Management Mode...", (250, 500), 0.05),
        E::normal("Loading ACPI tables...", (150, 350), 0.05),
        E::normal("Verifying DMI pool data...", (100, 250), 0.02),
        E::normal("Detecting PnP devices...", (250, 500), 0.05),
        E::normal("BIOS setup completed", (100, 250), 0.01),
        E::normal("Booting from PrimeDisk HDD...", (3500, 8000), 0.0),
        E::normal("Loading Akiba OS v0.1.0...", (2500, 5000), 0.0),
        E::normal("Verifying system integrity...", (3500, 4000), 0.0),
        E::normal("Loading Akiba OS Kernel...", (6000, 10000), 0.0),
        E::normal("Initializing memory management...", (500, 1000), 0.0),
        E::normal("Initializing process scheduler...", (150, 350), 0.05),
        E::normal("Loading device drivers...", (500, 1000), 0.1),
        E::normal("  > VesperTech VGA Driver", (100, 250), 0.05),
        E::normal("  > PrimeDisk Disk Driver", (100, 250), 0.05),
        E::normal("  > LunaPort USB Driver", (100, 250), 0.05),
        E::normal("  > NovaSonic Audio Driver", (100, 250), 0.05),
        E::normal("  > ZenithNet Ethernet Driver", (100, 250), 0.05),
        E::normal("  > NovaTech NVRAM Driver", (100, 250), 0.05),
        E::normal("  > PX/2 Mouse Driver", (100, 250), 0.05),
        E::normal("  > PX/2 Keyboard Driver", (100, 250), 0.05),
        E::normal("Mounting filesystems...", (500, 1000), 0.1),
        E::normal("Performing filesystem check...", (1500, 3500), 0.1),
        E::normal("Loading system configuration...", (250, 500), 0.05),
        E::normal("Initializing system services...", (500, 1000), 0.1),
        E::normal("  > Akiba Core Services", (100, 250), 0.05),
        E::normal("  > AKFS FileSystem Service", (100, 250), 0.05),
        E::normal("  > Network Stack Service", (100, 250), 0.05),
        E::normal("  > Audio Service", (100, 250), 0.05),
        E::normal("  > USB Service", (100, 250), 0.05),
        E::normal("  > Display Service", (100, 250), 0.05),
        E::normal("  > Input Service", (100, 250), 0.05),
        E::normal("  > System Management Service", (100, 250), 0.05),
        E::normal("  > Security Service", (100, 250), 0.05),
        E::normal("Initializing network...", (500, 1000), 0.1),
        E::normal("  > Ethernet Link Connected (10 Mbps)", (250, 500), 0.1),
        E::normal("  > Acquiring IP address...", (500, 1000), 0.1),
        E::normal(format!("  > IP Address: {}", random_ip(rng)), (50, 150), 0.0),
        E::normal(format!("  > Subnet Mask: {}", random_ip(rng)), (50, 150), 0.0),
        E::normal(format!("  > Gateway: {}", random_ip(rng)), (50, 150), 0.0),
        E::normal(format!("  > DNS: {}", random_ip(rng)), (50, 150), 0.0),
        E::normal(format!("  > MAC Address: {}", random_mac(rng)), (50, 150), 0.0),
        E::normal("Initializing audio subsystem...", (250, 500), 0.05),
        E::normal("Initializing USB subsystem...", (250, 500), 0.05),
        E::normal("Initializing input devices...", (250, 500), 0.05),
        E::normal("Loading system fonts...", (150, 350), 0.02),
        E::normal("Initializing power management...", (150, 350), 0.05),
        E::normal("Loading user profiles...", (250, 500), 0.05),
        E::normal("Initializing system background tasks...", (100, 250), 0.02),
        E::normal("Loading desktop environment...", (500, 1000), 0.1),
        E::normal("  > Akiba Desktop Experience", (2500, 5000), 0.05),
        E::normal("Initializing window manager...", (250, 500), 0.05),
        E::normal("Loading desktop icons...", (150, 350), 0.02),
        E::normal("Initializing control bar...", (100, 250), 0.02),
        E::normal("Initializing system clock...", (50, 150), 0.01),
        E::normal("Loading startup programs...", (250, 500), 0.05),
        E::normal("Initializing virtual memory...", (150, 350), 0.05),
        E::normal("Performing final system checks...", (250, 500), 0.05),
        E::normal("Optimizing system performance...", (250, 500), 0.05),
        E::normal("Initializing system recovery services...", (150, 350), 0.05),
        E::normal("Checking disk quotas...", (100, 250), 0.02),
        E::normal("Initializing print spooler...", (100, 250), 0.02),
        E::normal("Initializing system logs...", (50, 150), 0.01),
        E::normal("Verifying system integrity...", (250, 500), 0.05),
        E::normal("Initializing networking protocols...", (150, 350), 0.05),
        E::normal("Loading firewall rules...", (100, 250), 0.05),
        E::normal("Initializing system monitors...", (100, 250), 0.02),
        E::normal("Performing cleanup...", (150, 350), 0.05),
        E::normal("Initializing user interface...", (250, 500), 0.05),
        E::normal("Loading user preferences...", (100, 250), 0.02),
        E::normal("Initializing clipboard...", (50, 150), 0.01),
        E::normal("Checking for peripheral devices...", (150, 350), 0.05),
        E::normal("Initializing system search indexer...", (250, 500), 0.05),
        E::normal("Loading user session...", (250, 500), 0.05),
        E::normal("Finalizing boot sequence...", (250, 500), 0.05),
        E::normal("Boot Complete! Akiba OS Ready!", (150, 350), 0.01),
        E::normal("Welcome to Akiba OS!", (100, 250), 0.0),
    ]
}
