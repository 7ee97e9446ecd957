use serde::{Deserialize, Serialize};

/// Reception report from one gateway, as the network server forwards it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RxInfo {
    pub mac: String,
    pub time: String,
    pub rssi: i32,
    #[serde(rename = "loRaSNR")]
    pub lora_snr: f64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRate {
    pub modulation: String,
    pub bandwidth: u32,
    pub spread_factor: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInfo {
    pub frequency: u64,
    pub data_rate: DataRate,
    pub adr: bool,
    pub code_rate: String,
}

/// The fixed part of every uplink: application identity and radio metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub application_id: String,
    pub application_name: String,
    pub rx_info: Vec<RxInfo>,
    pub tx_info: TxInfo,
    pub f_cnt: u32,
    pub f_port: u8,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            application_id: "17".to_string(),
            application_name: "SmartCampusMaua".to_string(),
            rx_info: vec![
                RxInfo {
                    mac: "7276ff000b031df7".to_string(),
                    time: "2024-03-28T22:33:26.728817Z".to_string(),
                    rssi: -97,
                    lora_snr: 11.2,
                    name: "IMT-kerlink-blocoW2".to_string(),
                    latitude: -23.64946,
                    longitude: -46.57367,
                    altitude: 777,
                },
                RxInfo {
                    mac: "7276ff00080801db".to_string(),
                    time: "2024-03-28T22:33:25Z".to_string(),
                    rssi: -100,
                    lora_snr: 11.5,
                    name: "IMT-kerlink-blocoH".to_string(),
                    latitude: -23.64891,
                    longitude: -46.57413,
                    altitude: 758,
                },
            ],
            tx_info: TxInfo {
                frequency: 916_200_000,
                data_rate: DataRate {
                    modulation: "LORA".to_string(),
                    bandwidth: 125,
                    spread_factor: 9,
                },
                adr: true,
                code_rate: "4/5".to_string(),
            },
            f_cnt: 135,
            f_port: 100,
        }
    }
}

impl Envelope {
    pub fn topic(&self, dev_eui: &str) -> String {
        format!("application/{}/node/{}/rx", self.application_id, dev_eui)
    }
}

/// Wire shape of an uplink body. Field order is the order on the wire.
#[derive(Debug, Serialize)]
pub struct Uplink<'a> {
    #[serde(rename = "applicationID")]
    pub application_id: &'a str,
    #[serde(rename = "applicationName")]
    pub application_name: &'a str,
    #[serde(rename = "nodeName")]
    pub node_name: &'a str,
    #[serde(rename = "devEUI")]
    pub dev_eui: &'a str,
    #[serde(rename = "rxInfo")]
    pub rx_info: &'a [RxInfo],
    #[serde(rename = "txInfo")]
    pub tx_info: &'a TxInfo,
    #[serde(rename = "fCnt")]
    pub f_cnt: u32,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    pub data: String,
}

/// Owned counterpart of [`Uplink`] for consumers parsing a body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ReceivedUplink {
    #[serde(rename = "applicationID")]
    pub application_id: String,
    #[serde(rename = "applicationName")]
    pub application_name: String,
    #[serde(rename = "nodeName")]
    pub node_name: String,
    #[serde(rename = "devEUI")]
    pub dev_eui: String,
    #[serde(rename = "rxInfo")]
    pub rx_info: Vec<RxInfo>,
    #[serde(rename = "txInfo")]
    pub tx_info: TxInfo,
    #[serde(rename = "fCnt")]
    pub f_cnt: u32,
    #[serde(rename = "fPort")]
    pub f_port: u8,
    pub data: String,
}
