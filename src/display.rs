//! ST7789 panel bring-up: 320×170 LCD over SPI with DMA, and its backlight.
//!
//! The game only ever draws into a 128×128 window; [`PLAYFIELD_OFFSET`]
//! says where that window lands on the panel.

use embedded_graphics::prelude::Point;
use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Async,
    delay::Delay,
    dma::{
        DmaRxBuf,
        DmaTxBuf,
    },
    dma_buffers,
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    spi::master::{
        Config as SpiConfig,
        Spi,
        SpiDmaBus,
    },
    time::Rate,
};
use mipidsi::{
    Builder,
    models::ST7789,
    options::{
        ColorInversion,
        Orientation,
        Rotation,
    },
};

use crate::{
    BacklightResources,
    DisplayResources,
    config::{
        FIELD_H,
        FIELD_W,
    },
    mk_static,
};

const PANEL_W: i32 = 320;
const PANEL_H: i32 = 170;
/// The controller's RAM is 240 wide; the glass starts at column 35.
const PANEL_COLUMN_OFFSET: u16 = 35;
const SPI_CLOCK: Rate = Rate::from_mhz(80);
const DMA_LEN: usize = 32_000;

/// Where the 128×128 playfield sits on the panel: centred.
pub const PLAYFIELD_OFFSET: Point = Point::new(
    (PANEL_W - FIELD_W as i32) / 2,
    (PANEL_H - FIELD_H as i32) / 2,
);

type PanelBus<'a> = ExclusiveDevice<SpiDmaBus<'a, Async>, Output<'a>, Delay>;
type SpiInterface<'a> = mipidsi::interface::SpiInterface<'a, PanelBus<'a>, Output<'a>>;

/// The badge's ST7789 display, drawn on with `embedded-graphics`.
pub type Display<'a> = mipidsi::Display<SpiInterface<'a>, ST7789, Output<'a>>;

/// Keeps the backlight pin driven high for as long as it lives.
pub struct Backlight {
    _pin: Output<'static>,
}

impl From<BacklightResources<'static>> for Backlight {
    fn from(res: BacklightResources<'static>) -> Self {
        Self {
            _pin: Output::new(res.led, Level::High, OutputConfig::default()),
        }
    }
}

/// SPI2 with DMA in both directions, chip select owned by the device.
///
/// Panics if the SPI or DMA setup is rejected.
fn panel_bus(res: DisplayResources<'static>) -> (PanelBus<'static>, Output<'static>, Output<'static>) {
    let (rx_buffer, rx_descriptors, tx_buffer, tx_descriptors) = dma_buffers!(DMA_LEN);
    let rx = DmaRxBuf::new(rx_descriptors, rx_buffer).expect("display DMA rx descriptors");
    let tx = DmaTxBuf::new(tx_descriptors, tx_buffer).expect("display DMA tx descriptors");

    let bus = Spi::new(res.spi, SpiConfig::default().with_frequency(SPI_CLOCK))
        .expect("display SPI config")
        .with_sck(res.sck)
        .with_mosi(res.mosi)
        .with_miso(res.miso)
        .with_dma(res.dma)
        .with_buffers(rx, tx)
        .into_async();

    let cs = Output::new(res.cs, Level::High, OutputConfig::default());
    let device = ExclusiveDevice::new(bus, cs, Delay::new()).expect("display chip select");

    let dc = Output::new(res.dc, Level::Low, OutputConfig::default());
    let mut rst = Output::new(res.rst, Level::Low, OutputConfig::default());
    rst.set_high();

    (device, dc, rst)
}

impl From<DisplayResources<'static>> for Display<'static> {
    fn from(res: DisplayResources<'static>) -> Self {
        let (device, dc, rst) = panel_bus(res);
        let frame_buffer = mk_static!([u8; DMA_LEN], [0_u8; DMA_LEN]);
        let interface = mipidsi::interface::SpiInterface::new(device, dc, frame_buffer);

        // Landscape, USB connector on the left.
        Builder::new(ST7789, interface)
            .reset_pin(rst)
            .display_size(PANEL_H as u16, PANEL_W as u16)
            .display_offset(PANEL_COLUMN_OFFSET, 0)
            .invert_colors(ColorInversion::Inverted)
            .orientation(Orientation::new().rotate(Rotation::Deg90))
            .init(&mut Delay::new())
            .expect("ST7789 init sequence")
    }
}
