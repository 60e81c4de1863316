#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod network;
mod power;
mod reader_port;

stm32_tim2_monotonic!(Mono, 1_000_000);

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2, USART3])]
mod app {
    use super::*;
    use defmt::info;
    use embassy_futures::join::join3;
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use embassy_stm32::usart::{self, Uart};
    use embassy_time::Delay;
    use rfid_core::{Firmware, LogSink, M6eNano};

    use network::wifi::{self, EspPeripherals};
    use network::{firmware_config, EspWifiLink, SntpClient, WifiConfig};
    use power::MonoSleep;
    use reader_port::ReaderPort;

    type Peri<T> = embassy_stm32::Peri<'static, T>;

    /// USART6 on the Feather's D6 (PC6, TX) / D5 (PC7, RX) pads
    struct ReaderPeripherals {
        usart: Peri<peripherals::USART6>,
        tx: Peri<peripherals::PC6>,
        rx: Peri<peripherals::PC7>,
        dma_tx: Peri<peripherals::DMA2_CH6>,
        dma_rx: Peri<peripherals::DMA2_CH1>,
    }

    /// ESP32 Wi-Fi co-processor (ESP-Hosted) on SPI2
    struct NetworkPeripherals {
        spi: Peri<peripherals::SPI2>,
        sck: Peri<peripherals::PB13>,
        mosi: Peri<peripherals::PB15>,
        miso: Peri<peripherals::PB14>,
        cs: Peri<peripherals::PC1>,
        reset: Peri<peripherals::PC2>,
        handshake: Peri<peripherals::PC3>,
        handshake_exti: Peri<peripherals::EXTI3>,
        ready: Peri<peripherals::PB9>,
        ready_exti: Peri<peripherals::EXTI9>,
        dma_tx: Peri<peripherals::DMA1_CH4>,
        dma_rx: Peri<peripherals::DMA1_CH3>,
    }

    embassy_stm32::bind_interrupts!(struct UartIrqs {
        USART6 => usart::InterruptHandler<peripherals::USART6>;
    });

    /// DMA ring for reader responses; comfortably larger than one frame
    const READER_RX_RING_LEN: usize = 512;

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("RFID census starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK)
        // VCO / DIVQ(7) = 48 MHz
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz (USART6)

        let p = embassy_stm32::init(config);
        info!("System initialized: SYSCLK=84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let reader_periph = ReaderPeripherals {
            usart: p.USART6,
            tx: p.PC6,
            rx: p.PC7,
            dma_tx: p.DMA2_CH6,
            dma_rx: p.DMA2_CH1,
        };

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC1,
            reset: p.PC2,
            handshake: p.PC3,
            handshake_exti: p.EXTI3,
            ready: p.PB9,
            ready_exti: p.EXTI9,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };

        acquisition_task::spawn(reader_periph, net_periph).ok();

        (Shared {}, Local {})
    }

    /// Acquisition task - owns the network stack and the reader
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1)]
    async fn acquisition_task(
        _cx: acquisition_task::Context,
        reader_periph: ReaderPeripherals,
        net_periph: NetworkPeripherals,
    ) {
        use embassy_net::{Config, StackResources};
        use static_cell::StaticCell;

        info!("Acquisition task started");

        let firmware_config = firmware_config();

        // Reader UART, starting at the module's power-on rate
        let mut uart_config = usart::Config::default();
        uart_config.baudrate = firmware_config.reader.default_baud_rate;
        let uart = match Uart::new(
            reader_periph.usart,
            reader_periph.rx,
            reader_periph.tx,
            UartIrqs,
            reader_periph.dma_tx,
            reader_periph.dma_rx,
            uart_config,
        ) {
            Ok(uart) => uart,
            Err(e) => defmt::panic!("Reader UART setup failed: {:?}", e),
        };
        let (uart_tx, uart_rx) = uart.split();
        static READER_RX_RING: StaticCell<[u8; READER_RX_RING_LEN]> = StaticCell::new();
        let uart_rx = uart_rx.into_ring_buffered(READER_RX_RING.init([0; READER_RX_RING_LEN]));
        let reader_port = ReaderPort::new(uart_tx, uart_rx, uart_config);

        // Wi-Fi co-processor
        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000);

        let spi = Spi::new(
            net_periph.spi,
            net_periph.sck,
            net_periph.mosi,
            net_periph.miso,
            net_periph.dma_tx,
            net_periph.dma_rx,
            spi_config,
        );

        let esp_periph = EspPeripherals {
            spi,
            cs: Output::new(net_periph.cs, Level::High, Speed::VeryHigh),
            reset: Output::new(net_periph.reset, Level::High, Speed::Low),
            handshake: ExtiInput::new(net_periph.handshake, net_periph.handshake_exti, Pull::Down),
            ready: ExtiInput::new(net_periph.ready, net_periph.ready_exti, Pull::Down),
        };
        let (device, control, esp_runner) = wifi::init_esp_hosted(esp_periph).await;

        let wifi_config = WifiConfig::default();
        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            wifi_config.seed,
        );
        info!("Network stack initialized with DHCP");

        let app_logic = async {
            let mut firmware = Firmware::new(
                firmware_config,
                M6eNano::new(reader_port, Delay),
                EspWifiLink::new(control, stack, wifi_config),
                SntpClient::new(stack),
                MonoSleep,
                Delay,
                LogSink,
            );
            match firmware.run().await {
                Ok(never) => match never {},
                Err(e) => defmt::panic!("Reader initialization failed: {}", e),
            }
        };

        join3(esp_runner.run(), net_runner.run(), app_logic).await;
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
