//! Page bodies served by the control panel.

use core::fmt::Write;
use core::net::Ipv4Addr;

use embassy_time::Duration;
use log::error;

use crate::buffer::ResponseBuffer;
use crate::stats::{CpuStats, UptimeParts};
use crate::{Error, Result};

pub const INDEX_PAGE: &str = concat!(
    "<html><head><title>ARP Offload</title></head>",
    "<script>",
    "function host_in_sleep()",
    "{",
    "alert('Warning! The host MCU will enter deep sleep. ",
    "It wakes up as soon as its network stack sees TX/RX activity.\\n\\n",
    "Broadcast or multicast traffic from other peers can wake the host more often. ",
    "For longer sleep, keep only this kit associated to the access point.\\n\\n",
    "To wake the host, browse to the kit IP address or ping it.');",
    "}",
    "</script>",
    "<body><h1>WLAN ARP Offload</h1>",
    "<form action=\"/sleep\" method=\"post\">",
    "<button style=\"font-size: 15px; width: 210px; height: 80px; cursor: pointer\" ",
    "name=\"subject\" type=\"submit\" value=\"sleep\" onclick=\"host_in_sleep();\">",
    "Simulate Host sleep<br>(suspend Host Network Stack)</button>",
    "</form>",
    "<form action=\"/stats\" method=\"post\">",
    "<button style=\"font-size: 15px; width: 210px; height: 80px; cursor: pointer\" ",
    "name=\"subject\" type=\"submit\" value=\"stats\">Get sleep stats</button>",
    "</form>",
    "</body>",
    "</html>",
);

const STATS_HEAD: &str = concat!(
    "<html><head><title>ARP Offload - Sleep Stats</title></head>",
    "<body><h1>Host MCU sleep stats</h1>",
    "<textarea readonly rows=\"4\" cols=\"50\" style=\"font-size: large; ",
    "color: rgb(11, 11, 11); background-color: rgb(232, 221, 238); ",
    "width: 450px; height: 180px;\">",
);
const STATS_TAIL: &str = "</textarea></body></html>";

const WAKE_HEAD: &str = concat!(
    "<html><head><title>ARP Offload - Wake Host</title>",
    "<meta http-equiv=\"refresh\" content=\"0; url=http://",
);
const WAKE_TAIL: &str = "\"/></head><body><p>Waking Host</p></body></html>";

const SLEEP_HEAD: &str = concat!(
    "<html><body>",
    "<form action=\"/wake\" method=\"post\">",
    "<a href=\"http://",
);
const SLEEP_TAIL: &str = concat!(
    "\">Wake Host</a>",
    "<br><br>",
    "<b>Note</b>: <i>This link redirects to the main page. ",
    "The request is network activity: it wakes the host if it is sleeping ",
    "and resumes the network stack if it was suspended.</i>",
    "</form>",
    "</body>",
    "</html>",
);

/// A page must leave at least one byte of the buffer unused.
fn finish<const S: usize>(buf: &mut ResponseBuffer<S>, written: core::fmt::Result) -> Result<()> {
    if written.is_err() || buf.len() >= S {
        error!("HTTP response string length exceeds the buffer size ({} bytes)", S);
        buf.clear();
        return Err(Error::BufferOverflow);
    }
    Ok(())
}

/// Page shown after the sleep button: a link back to the device that wakes it.
pub fn render_sleep<const S: usize>(ip: Ipv4Addr, buf: &mut ResponseBuffer<S>) -> Result<()> {
    let written = write!(buf, "{}{}{}", SLEEP_HEAD, ip, SLEEP_TAIL);
    finish(buf, written)
}

/// Redirects the browser to the device's own address.
pub fn render_wake<const S: usize>(ip: Ipv4Addr, buf: &mut ResponseBuffer<S>) -> Result<()> {
    let written = write!(buf, "{}{}{}", WAKE_HEAD, ip, WAKE_TAIL);
    finish(buf, written)
}

/// Sleep statistics. The OS counters are left out when `cpu` is `None`.
pub fn render_stats<const S: usize>(
    cpu: Option<&CpuStats>,
    suspended: Duration,
    suspensions: u32,
    buf: &mut ResponseBuffer<S>,
) -> Result<()> {
    let written = write_stats(cpu, suspended, suspensions, buf);
    finish(buf, written)
}

fn write_stats<const S: usize>(
    cpu: Option<&CpuStats>,
    suspended: Duration,
    suspensions: u32,
    buf: &mut ResponseBuffer<S>,
) -> core::fmt::Result {
    buf.write_str(STATS_HEAD)?;
    buf.write_str("OS sleep manager stats:")?;
    if let Some(cpu) = cpu {
        let up = UptimeParts::from(cpu.uptime);
        write!(
            buf,
            "\n\tuptime(hh:mm:ss)\t:{}:{}:{},\
             \n\tidle(seconds)\t\t:{},\
             \n\tsleep(seconds)\t\t:{},\
             \n\tdsleep(seconds)\t\t:{}\n ",
            up.hours,
            up.minutes,
            up.seconds,
            cpu.idle.as_secs(),
            cpu.sleep.as_secs(),
            cpu.deep_sleep.as_secs(),
        )?;
    }
    write!(
        buf,
        "\nDeepsleep with Network Stack suspended(Low Power time):\
         \n\tHost Deepsleep(seconds)\t:{}\n\tSuspensions\t\t:{}\n",
        suspended.as_secs(),
        suspensions
    )?;
    buf.write_str(STATS_TAIL)
}

#[cfg(test)]
mod tests {
    use super::*;

    const IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 42);

    fn body<const S: usize>(buf: &ResponseBuffer<S>) -> &str {
        core::str::from_utf8(buf.buffer()).unwrap()
    }

    #[test]
    fn index_page_offers_sleep_and_stats() {
        assert!(INDEX_PAGE.contains("action=\"/sleep\""));
        assert!(INDEX_PAGE.contains("action=\"/stats\""));
        assert!(INDEX_PAGE.ends_with("</html>"));
    }

    #[test]
    fn sleep_page_links_to_device_address() {
        let mut buf = ResponseBuffer::<1024>::new();
        render_sleep(IP, &mut buf).unwrap();
        let body = body(&buf);
        assert!(body.contains("<a href=\"http://192.168.1.42\">Wake Host</a>"));
        assert!(body.contains("action=\"/wake\""));
    }

    #[test]
    fn wake_page_redirects_to_device_address() {
        let mut buf = ResponseBuffer::<1024>::new();
        render_wake(IP, &mut buf).unwrap();
        assert!(body(&buf).contains("content=\"0; url=http://192.168.1.42\"/>"));
    }

    #[test]
    fn stats_page_with_cpu_counters() {
        let cpu = CpuStats {
            uptime: Duration::from_secs(3723),
            idle: Duration::from_secs(40),
            sleep: Duration::from_secs(20),
            deep_sleep: Duration::from_secs(10),
        };
        let mut buf = ResponseBuffer::<1024>::new();
        render_stats(Some(&cpu), Duration::from_millis(7_900), 3, &mut buf).unwrap();
        let body = body(&buf);
        assert!(body.contains("uptime(hh:mm:ss)\t:1:2:3,"));
        assert!(body.contains("idle(seconds)\t\t:40,"));
        assert!(body.contains("dsleep(seconds)\t\t:10"));
        assert!(body.contains("Host Deepsleep(seconds)\t:7\n"));
        assert!(body.contains("Suspensions\t\t:3\n"));
    }

    #[test]
    fn stats_page_without_cpu_counters_omits_them() {
        let mut buf = ResponseBuffer::<1024>::new();
        render_stats(None, Duration::from_secs(12), 1, &mut buf).unwrap();
        let body = body(&buf);
        assert!(!body.contains("uptime"));
        assert!(!body.contains("idle"));
        assert!(body.contains("Host Deepsleep(seconds)\t:12\n"));
        assert!(body.ends_with(STATS_TAIL));
    }

    #[test]
    fn overflow_leaves_buffer_empty() {
        let mut buf = ResponseBuffer::<64>::new();
        assert_eq!(render_wake(IP, &mut buf), Err(Error::BufferOverflow));
        assert!(buf.is_empty());
        assert_eq!(render_sleep(IP, &mut buf), Err(Error::BufferOverflow));
        assert_eq!(
            render_stats(None, Duration::from_secs(1), 0, &mut buf),
            Err(Error::BufferOverflow)
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn page_filling_the_whole_buffer_is_refused() {
        const EXACT: usize = WAKE_HEAD.len() + "192.168.1.42".len() + WAKE_TAIL.len();

        let mut buf = ResponseBuffer::<EXACT>::new();
        assert_eq!(render_wake(IP, &mut buf), Err(Error::BufferOverflow));
        assert!(buf.is_empty());

        let mut buf = ResponseBuffer::<{ EXACT + 1 }>::new();
        assert_eq!(render_wake(IP, &mut buf), Ok(()));
        assert_eq!(buf.len(), EXACT);
    }
}
