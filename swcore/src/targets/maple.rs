use log::debug;

use super::{read_chip_info, read_chip_name, ChipIdentity};
use crate::{
    pinctrl::{FunctionDesc, GroupId, MuxConfig, MuxDesc, PinDesc, SwcoreConfig},
    regmap::{genmask, RegField, RegisterMap},
    switchcore::DeviceCell,
    Error,
};

const INT_RW_CTRL: u32 = 0x0058;
const INT_RW_CTRL_UNLOCK: u32 = genmask(1, 0);

const MODE_DEFINE_CTL: u32 = 0x1024;
// Clear on the RTL8381
const MODE_DEFINE_CTL_8380: u32 = 1 << 23;

const MODEL_NAME_INFO: u32 = 0x00d4;
const CHIP_INFO: u32 = 0x00d8;

pub(super) const MODELS: &[u16] = &[0x8380, 0x8381, 0x8382];

pub(super) const DEVICES: &[DeviceCell] = &[
    DeviceCell::new("realtek-switchcore-sys-led", "realtek,maple-sys-led"),
    DeviceCell::new("realtek-switchcore-port-leds", "realtek,maple-port-led"),
    DeviceCell::new("realtek-switchcore-pinctrl", "realtek,maple-pinctrl"),
];

pub(super) fn identify<M: RegisterMap + ?Sized>(map: &mut M) -> Result<ChipIdentity, Error> {
    // The identification registers are behind the global register lock
    map.write(INT_RW_CTRL, INT_RW_CTRL_UNLOCK)?;

    let (mut model_id, model_suffix) = read_chip_name(map, MODEL_NAME_INFO)?;
    if model_id == 0x8380 && map.read(MODE_DEFINE_CTL)? & MODE_DEFINE_CTL_8380 == 0 {
        debug!("RTL8380 mode bit is clear, reporting RTL8381");
        model_id = 0x8381;
    }

    let (revision, rl_id) = read_chip_info(map, CHIP_INFO)?;

    Ok(ChipIdentity {
        model_id,
        model_suffix,
        // Hardware counts revisions from one, except for the first cut
        revision: revision.saturating_sub(1),
        rl_id,
    })
}

pub(crate) const JTAG: GroupId = GroupId(0);
pub(crate) const AUX_MDIO: GroupId = GroupId(1);
pub(crate) const SYS_LED: GroupId = GroupId(2);
pub(crate) const UART1: GroupId = GroupId(3);

static PINS: &[PinDesc] = &[
    PinDesc::new(28, "JTAG_TCK/GPIO13"),
    PinDesc::new(29, "JTAG_TMS/GPIO12"),
    PinDesc::new(30, "JTAG_TDO/GPIO10"),
    PinDesc::new(31, "JTAG_TDI/GPIO11"),
    PinDesc::new(32, "JTAG_TRST#/GPIO14"),
    PinDesc::new(110, "GPIO3/AUX_MDIO"),
    PinDesc::new(111, "GPIO2/AUX_MDC"),
    PinDesc::new(113, "GPIO0/SYS_LED"),
    PinDesc::new(116, "SSPI_CS#/UART1_RX"),
    PinDesc::new(117, "SSPI_SO/UART1_TX"),
    PinDesc::new(120, "MDC"),
    PinDesc::new(121, "MDIO"),
];

static GROUPS: &[MuxDesc] = &[
    MuxDesc::new("jtag", RegField::new(0x1000, 2, 3), &[28, 29, 30, 31, 32]),
    MuxDesc::new("aux-mdio", RegField::new(0xa0e0, 0, 0), &[110, 111]),
    MuxDesc::new("sys-led", RegField::new(0xa000, 15, 15), &[113]),
    MuxDesc::new("uart1", RegField::new(0x1000, 4, 4), &[116, 117]),
];

static FUNCTIONS: &[FunctionDesc] = &[
    FunctionDesc::new(
        "gpio",
        &[
            MuxConfig::new(JTAG, 2),
            MuxConfig::new(AUX_MDIO, 0),
            MuxConfig::new(SYS_LED, 0),
        ],
    ),
    FunctionDesc::new("aux-mdio", &[MuxConfig::new(AUX_MDIO, 1)]),
    FunctionDesc::new("sys-led", &[MuxConfig::new(SYS_LED, 1)]),
    FunctionDesc::new("uart1", &[MuxConfig::new(UART1, 1)]),
    FunctionDesc::new("spi-slave", &[MuxConfig::new(UART1, 0)]),
];

pub(super) static PINCTRL: SwcoreConfig = SwcoreConfig {
    pins: PINS,
    groups: GROUPS,
    functions: FUNCTIONS,
};
