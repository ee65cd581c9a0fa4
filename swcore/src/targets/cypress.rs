use super::{read_chip_info, read_chip_name, ChipIdentity};
use crate::{
    pinctrl::{FunctionDesc, GroupId, MuxConfig, MuxDesc, PinDesc, SwcoreConfig},
    regmap::{RegField, RegisterMap},
    switchcore::DeviceCell,
    Error,
};

const MODEL_NAME_INFO: u32 = 0x0ff0;
const CHIP_INFO: u32 = 0x0ff4;

pub(super) const MODELS: &[u16] = &[0x8390, 0x8391, 0x8392, 0x8393, 0x8396];

pub(super) const DEVICES: &[DeviceCell] = &[
    DeviceCell::new("realtek-switchcore-sys-led", "realtek,cypress-sys-led"),
    DeviceCell::new("realtek-switchcore-port-leds", "realtek,cypress-port-led"),
    DeviceCell::new("realtek-switchcore-pinctrl", "realtek,cypress-pinctrl"),
];

pub(super) fn identify<M: RegisterMap + ?Sized>(map: &mut M) -> Result<ChipIdentity, Error> {
    let (model_id, model_suffix) = read_chip_name(map, MODEL_NAME_INFO)?;
    let (revision, rl_id) = read_chip_info(map, CHIP_INFO)?;

    Ok(ChipIdentity {
        model_id,
        model_suffix,
        revision,
        rl_id,
    })
}

/// The package pins are not documented, so pins are numbered past the end of
/// the package
const fn virtual_pin(n: u32) -> u32 {
    676 + n
}

pub(crate) const JTAG: GroupId = GroupId(0);
pub(crate) const AUX_MDIO: GroupId = GroupId(1);
pub(crate) const SYS_LED: GroupId = GroupId(2);

static PINS: &[PinDesc] = &[
    PinDesc::new(virtual_pin(0), "GPIO0/SYS_LED"),
    PinDesc::new(virtual_pin(1), "AUX_MDC"),
    PinDesc::new(virtual_pin(2), "AUX_MDIO"),
    PinDesc::new(virtual_pin(3), "JTAG_TMS/UART1_RTS/GPIO3"),
    PinDesc::new(virtual_pin(4), "JTAG_TCK/UART1_CTS/GPIO4"),
    PinDesc::new(virtual_pin(5), "JTAG_TRST#/UART1_/GPIO5"),
    PinDesc::new(virtual_pin(6), "JTAG_TDI/UART1_RX/GPIO6"),
    PinDesc::new(virtual_pin(7), "JTAG_TDO/UART1_TX/GPIO7"),
];

const JTAG_PINS: &[u32] = &[
    virtual_pin(3),
    virtual_pin(4),
    virtual_pin(5),
    virtual_pin(6),
    virtual_pin(7),
];
const AUX_MDIO_PINS: &[u32] = &[virtual_pin(1), virtual_pin(2)];
const SYS_LED_PINS: &[u32] = &[virtual_pin(0)];

static GROUPS: &[MuxDesc] = &[
    MuxDesc::new("jtag", RegField::new(0x0004, 0, 1), JTAG_PINS),
    MuxDesc::new("aux-mdio", RegField::new(0x00e4, 18, 20), AUX_MDIO_PINS),
    MuxDesc::new("sys-led", RegField::new(0x00e4, 14, 14), SYS_LED_PINS),
];

static FUNCTIONS: &[FunctionDesc] = &[
    FunctionDesc::new(
        "gpio",
        &[
            MuxConfig::new(JTAG, 2),
            // Vendor code disables the auxiliary bus this way, but it is
            // unknown whether the pins are released to GPIO
            MuxConfig::unverified(AUX_MDIO, 0),
            MuxConfig::new(SYS_LED, 0),
        ],
    ),
    // Undocumented vendor value
    FunctionDesc::new("aux-mdio", &[MuxConfig::new(AUX_MDIO, 4)]),
    FunctionDesc::new("jtag", &[MuxConfig::new(JTAG, 0)]),
    FunctionDesc::new("sys-led", &[MuxConfig::new(SYS_LED, 1)]),
    FunctionDesc::new("uart1", &[MuxConfig::new(JTAG, 1)]),
];

pub(super) static PINCTRL: SwcoreConfig = SwcoreConfig {
    pins: PINS,
    groups: GROUPS,
    functions: FUNCTIONS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regmap::{genmask, memory::MemoryMap};

    #[test]
    fn identify_rtl8393() {
        let mut map = MemoryMap::new()
            .with_registers([(MODEL_NAME_INFO, 0x8393_6800), (CHIP_INFO, 0x0001_0399)])
            .with_read_only(CHIP_INFO, genmask(27, 0));

        let identity = identify(&mut map).unwrap();

        // No lock to disable, and revisions are reported as-is
        assert_eq!(map.writes(), &[(CHIP_INFO, 0xa001_0399)]);
        assert_eq!(identity.to_string(), "RTL8393M rev. B, RL:0399");
    }

    #[test]
    fn identify_without_suffix() {
        let mut map = MemoryMap::new().with_register(MODEL_NAME_INFO, 0x8391_0000);

        let identity = identify(&mut map).unwrap();
        assert_eq!(identity.model_id, 0x8391);
        assert_eq!(identity.model_suffix, None);
    }

    #[test]
    fn identify_suffix_past_z() {
        let mut map = MemoryMap::new().with_register(MODEL_NAME_INFO, 0x8393_0000 | 27 << 11);

        let identity = identify(&mut map).unwrap();
        assert_eq!(identity.model_suffix, Some('['));
        assert!(identity.to_string().starts_with("RTL8393[ rev."));
    }

    #[test]
    fn group_ids_match_table() {
        for (id, name) in [(JTAG, "jtag"), (AUX_MDIO, "aux-mdio"), (SYS_LED, "sys-led")] {
            assert_eq!(PINCTRL.group(id).unwrap().name, name);
        }
    }

    #[test]
    fn table_is_valid() {
        PINCTRL.validate().unwrap();

        assert!(PINCTRL.pins.iter().all(|pin| pin.number >= 676));
        assert!(!PINCTRL.functions[0].config_for(AUX_MDIO).unwrap().verified);
    }
}
