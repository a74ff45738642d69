//! Mock modem harness
//!
//! Boots the simulator and walks a scripted call scenario end to end:
//! dial with automatic progression, hang up, trip an incoming call, answer
//! it. Every completion and unsolicited notification the modem emits is
//! printed as it arrives.
//!
//! Run with `RUST_LOG=ril_sim=debug` for per-request dispatch logging.

use anyhow::Result;
use ril_proto::{
    codes, Body, DialReq, HangUpReq, JsonCodec, PayloadCodec, Schema, SetMtCallReq,
};
use ril_sim::{Emission, MockRil, SimConfig};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{timeout, Duration};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ril_harness=info,ril_sim=info,ril_proto=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Print emissions until the channel stays quiet for `window`.
async fn drain(emissions: &mut UnboundedReceiver<Emission>, window: Duration) {
    while let Ok(Some(emission)) = timeout(window, emissions.recv()).await {
        describe(&emission);
    }
}

fn describe(emission: &Emission) {
    match emission {
        Emission::RequestCompleted {
            error,
            code,
            token,
            payload,
        } => println!(
            "<- completion     code={code} token={token} status={error:?} payload={}B",
            payload.as_ref().map_or(0, Vec::len)
        ),
        Emission::ControlCompleted {
            status,
            code,
            token,
            payload,
        } => println!(
            "<- ctrl complete  code={code} token={token} status={status:?} payload={}B",
            payload.as_ref().map_or(0, Vec::len)
        ),
        Emission::Unsolicited { code, .. } => {
            let label = match *code {
                codes::UNSOL_RADIO_STATE_CHANGED => "radio state changed",
                codes::UNSOL_CALL_STATE_CHANGED => "call state changed",
                codes::UNSOL_CALL_RING => "ring",
                codes::UNSOL_SIGNAL_STRENGTH => "signal strength",
                _ => "unsolicited",
            };
            println!("<- unsolicited    code={code} ({label})");
        }
    }
}

/// Fetch and print the live call list.
async fn show_calls(
    ril: &MockRil,
    emissions: &mut UnboundedReceiver<Emission>,
    codec: &JsonCodec,
    token: i64,
) -> Result<()> {
    ril.submit_device_request(codes::REQUEST_GET_CURRENT_CALLS, token, b"");
    loop {
        let Some(emission) = emissions.recv().await else {
            anyhow::bail!("emission channel closed");
        };
        if let Emission::RequestCompleted {
            code: codes::REQUEST_GET_CURRENT_CALLS,
            payload: Some(payload),
            ..
        } = &emission
        {
            let Body::CurrentCalls(rsp) = codec.decode(Schema::RspCurrentCalls, payload)? else {
                anyhow::bail!("unexpected payload shape");
            };
            if rsp.calls.is_empty() {
                println!("   calls: (none)");
            }
            for call in &rsp.calls {
                println!(
                    "   call #{} {:?} number={} multiparty={}",
                    call.index, call.state, call.number, call.is_multiparty
                );
            }
            return Ok(());
        }
        describe(&emission);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    info!("starting mock modem harness");

    let codec = JsonCodec::new();
    let (ril, mut emissions) = MockRil::start(SimConfig::default());
    drain(&mut emissions, Duration::from_millis(100)).await;

    println!("== dial 555-0100, automatic progression ==");
    let dial = codec.encode(
        Schema::ReqDial,
        &Body::Dial(DialReq {
            address: "555-0100".into(),
            clir: 0,
        }),
    )?;
    ril.submit_device_request(codes::REQUEST_DIAL, 1, &dial);
    // The call turns alerting at +1s and active at +2s.
    drain(&mut emissions, Duration::from_millis(2_500)).await;
    show_calls(&ril, &mut emissions, &codec, 2).await?;

    println!("== hang up ==");
    let hangup = codec.encode(
        Schema::ReqHangUp,
        &Body::HangUp(HangUpReq {
            connection_index: 1,
        }),
    )?;
    ril.submit_device_request(codes::REQUEST_HANGUP, 3, &hangup);
    drain(&mut emissions, Duration::from_millis(100)).await;

    println!("== incoming call from 555-0199 ==");
    let mt_call = codec.encode(
        Schema::CtrlReqSetMtCall,
        &Body::SetMtCall(SetMtCallReq {
            phone_number: "555-0199".into(),
        }),
    )?;
    ril.submit_control_request(codes::CTRL_SET_MT_CALL, 4, &mt_call);
    // Let it ring a couple of times.
    drain(&mut emissions, Duration::from_millis(3_500)).await;

    println!("== answer ==");
    ril.submit_device_request(codes::REQUEST_ANSWER, 5, b"");
    drain(&mut emissions, Duration::from_millis(100)).await;
    show_calls(&ril, &mut emissions, &codec, 6).await?;

    println!("== hang up and shut down ==");
    ril.submit_device_request(codes::REQUEST_HANGUP, 7, &hangup);
    drain(&mut emissions, Duration::from_millis(100)).await;
    show_calls(&ril, &mut emissions, &codec, 8).await?;

    info!("scenario complete");
    Ok(())
}
