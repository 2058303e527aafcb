//! On/off actuators: lights, bedside light, hood, fan, door.

use log::{info, warn};

use crate::app::ports::OutputPort;
use crate::error::CommandError;
use crate::registry::{Capability, Registry, ResourceBinding};

/// Drive the output bound to `(room, capability)` to `on`.
pub fn set_binary(
    registry: &Registry,
    hw: &mut impl OutputPort,
    room: &str,
    capability: Capability,
    on: bool,
) -> Result<(), CommandError> {
    let Some(binding) = registry.binding(room, capability) else {
        warn!(
            "Device: '{}' not found in room '{}' for this node",
            capability.id(),
            room
        );
        return Err(CommandError::DeviceNotFound);
    };

    match binding {
        ResourceBinding::Pin(pin) => {
            hw.write_level(pin, on);
            info!(
                "Device: '{}/{}' (pin {}) turned {}",
                room,
                capability.id(),
                pin,
                if on { "ON" } else { "OFF" }
            );
        }
        ResourceBinding::Simulated => {
            info!(
                "Device: '{}/{}' (virtual) turned {}",
                room,
                capability.id(),
                if on { "ON" } else { "OFF" }
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BindingSpec, DeviceSpec};
    use crate::devices::test_support::RecordingOutputs;

    fn registry() -> Registry {
        Registry::build(&[
            DeviceSpec::new("kitchen", "light", BindingSpec::Pin(26)),
            DeviceSpec::new("kitchen", "hood", BindingSpec::Simulated),
        ])
        .unwrap()
    }

    #[test]
    fn drives_bound_pin() {
        let reg = registry();
        let mut hw = RecordingOutputs::default();
        set_binary(&reg, &mut hw, "kitchen", Capability::Light, true).unwrap();
        set_binary(&reg, &mut hw, "kitchen", Capability::Light, false).unwrap();
        assert_eq!(hw.levels, vec![(26, true), (26, false)]);
    }

    #[test]
    fn virtual_binding_touches_no_pin() {
        let reg = registry();
        let mut hw = RecordingOutputs::default();
        set_binary(&reg, &mut hw, "kitchen", Capability::Hood, true).unwrap();
        assert!(hw.levels.is_empty());
    }

    #[test]
    fn missing_device_is_an_error() {
        let reg = registry();
        let mut hw = RecordingOutputs::default();
        assert_eq!(
            set_binary(&reg, &mut hw, "bedroom", Capability::Light, true),
            Err(CommandError::DeviceNotFound)
        );
        assert_eq!(
            set_binary(&reg, &mut hw, "kitchen", Capability::Fan, true),
            Err(CommandError::DeviceNotFound)
        );
        assert!(hw.levels.is_empty());
    }
}
