//! Embedded HTML/CSS/JS frontend for the nlink chat client.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. All state
//! lives server-side; the page talks to the JSON API under `/api/`.

/// The complete single-page chat client HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>NLINK</title>
<style>
:root {
  --bg: #0a0e14;
  --surface: #11161f;
  --border: #1e2733;
  --text: #d8e2ec;
  --text-muted: #77828f;
  --cyan: #39d2c0;
  --magenta: #c678dd;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
html, body { height: 100%; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 860px;
  height: 100%;
  margin: 0 auto;
  padding: 16px;
  display: flex;
  flex-direction: column;
}

/* Header / status bar */
header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 12px;
  padding: 10px 14px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
}

header .logo {
  font-family: var(--mono);
  font-weight: 700;
  font-size: 16px;
  color: var(--cyan);
  letter-spacing: 2px;
}

.status {
  display: flex;
  align-items: center;
  gap: 6px;
  font-family: var(--mono);
  font-size: 12px;
}

.status-dot {
  width: 8px;
  height: 8px;
  border-radius: 50%;
  background: var(--yellow);
  box-shadow: 0 0 8px var(--yellow);
}

.status-dot.online { background: var(--green); box-shadow: 0 0 8px var(--green); }
.status-dot.processing { background: var(--magenta); box-shadow: 0 0 8px var(--magenta); }

.metrics {
  display: flex;
  gap: 14px;
  font-family: var(--mono);
  font-size: 12px;
  color: var(--text-muted);
}

.metrics span b { color: var(--text); font-weight: 600; }

header .controls { display: flex; gap: 6px; }

header button {
  padding: 5px 10px;
  border: 1px solid var(--border);
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  font-size: 12px;
  cursor: pointer;
}

header button:hover { color: var(--text); border-color: var(--cyan); }

/* Messages */
#messages {
  flex: 1;
  overflow-y: auto;
  padding: 16px 4px;
  display: flex;
  flex-direction: column;
  gap: 12px;
}

.message { display: flex; gap: 10px; align-items: flex-start; }

.message-avatar {
  flex: 0 0 30px;
  height: 30px;
  display: flex;
  align-items: center;
  justify-content: center;
  border-radius: 6px;
  font-family: var(--mono);
  font-size: 11px;
  font-weight: 700;
}

.message.user .message-avatar { background: rgba(57,210,192,0.15); color: var(--cyan); }
.message.assistant .message-avatar { background: rgba(198,120,221,0.15); color: var(--magenta); }
.message.error .message-avatar { background: rgba(248,81,73,0.15); color: var(--red); }
.message.success .message-avatar { background: rgba(63,185,80,0.15); color: var(--green); }
.message.info .message-avatar { background: rgba(210,153,34,0.15); color: var(--yellow); }

.message-content {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 8px 12px;
  white-space: pre-wrap;
  word-break: break-word;
}

.message.error .message-content { border-color: var(--red); color: var(--red); }
.message.success .message-content { border-color: var(--green); }

.typing-indicator { display: flex; gap: 4px; padding: 12px; }

.typing-dot {
  width: 6px;
  height: 6px;
  border-radius: 50%;
  background: var(--magenta);
  animation: blink 1s infinite;
}

.typing-dot:nth-child(2) { animation-delay: 0.2s; }
.typing-dot:nth-child(3) { animation-delay: 0.4s; }

@keyframes blink { 0%, 80%, 100% { opacity: 0.2; } 40% { opacity: 1; } }

/* Input */
.composer {
  display: flex;
  gap: 8px;
  padding-top: 8px;
}

.composer input {
  flex: 1;
  padding: 10px 14px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
}

.composer input:focus { outline: none; border-color: var(--cyan); }

.composer button {
  padding: 10px 18px;
  border: none;
  border-radius: var(--radius);
  background: var(--cyan);
  color: #04110f;
  font-weight: 600;
  cursor: pointer;
}

.composer button:disabled { opacity: 0.4; cursor: default; }

/* Settings panel */
#configPanel {
  display: none;
  position: fixed;
  inset: 0;
  background: rgba(4,8,12,0.7);
  align-items: center;
  justify-content: center;
}

#configPanel.active { display: flex; }

.panel {
  width: min(440px, 90vw);
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
}

.panel h2 {
  font-size: 15px;
  color: var(--cyan);
  font-family: var(--mono);
  margin-bottom: 14px;
}

.panel label {
  display: block;
  font-size: 12px;
  color: var(--text-muted);
  margin: 10px 0 4px;
}

.panel input {
  width: 100%;
  padding: 8px 10px;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  font-family: var(--mono);
  font-size: 13px;
}

.panel input:focus { outline: none; border-color: var(--cyan); }

.panel .actions {
  display: flex;
  justify-content: flex-end;
  gap: 8px;
  margin-top: 16px;
}

.panel button {
  padding: 8px 14px;
  border-radius: 6px;
  border: 1px solid var(--border);
  background: transparent;
  color: var(--text-muted);
  cursor: pointer;
}

.panel button.primary {
  background: var(--cyan);
  border-color: var(--cyan);
  color: #04110f;
  font-weight: 600;
}
</style>
</head>
<body>
<div class="app">
  <header>
    <div class="logo">NLINK</div>
    <div class="status">
      <div class="status-dot" id="statusDot"></div>
      <span id="statusText">STANDBY</span>
    </div>
    <div class="metrics">
      <span>LAT <b id="latency">--</b></span>
      <span>TOK <b id="tokens">0</b></span>
      <span>UP <b id="uptime">00:00</b></span>
    </div>
    <div class="controls">
      <button id="purgeButton" title="Clear conversation">PURGE</button>
      <button id="settingsToggle" title="Settings">CONFIG</button>
    </div>
  </header>

  <div id="messages"></div>

  <div class="composer">
    <input id="messageInput" type="text" placeholder="Transmit a message..." autocomplete="off" autofocus>
    <button id="sendButton">SEND</button>
  </div>
</div>

<div id="configPanel">
  <div class="panel">
    <h2>CONFIGURATION</h2>
    <label for="apiKey">API key</label>
    <input id="apiKey" type="password" placeholder="sk-...">
    <label for="model">Model</label>
    <input id="model" type="text" placeholder="gpt-3.5-turbo">
    <label for="apiEndpoint">Endpoint</label>
    <input id="apiEndpoint" type="text" placeholder="https://api.openai.com/v1/chat/completions">
    <div class="actions">
      <button id="configClose">Close</button>
      <button id="configSave" class="primary">Save</button>
    </div>
  </div>
</div>

<script>
let config = { api_key: '', api_endpoint: '', model: '' };
let isProcessing = false;
let polling = false;

const el = {
  messages: document.getElementById('messages'),
  input: document.getElementById('messageInput'),
  send: document.getElementById('sendButton'),
  panel: document.getElementById('configPanel'),
  settingsToggle: document.getElementById('settingsToggle'),
  purge: document.getElementById('purgeButton'),
  configClose: document.getElementById('configClose'),
  configSave: document.getElementById('configSave'),
  apiKey: document.getElementById('apiKey'),
  model: document.getElementById('model'),
  apiEndpoint: document.getElementById('apiEndpoint'),
  statusText: document.getElementById('statusText'),
  statusDot: document.getElementById('statusDot'),
  latency: document.getElementById('latency'),
  tokens: document.getElementById('tokens'),
  uptime: document.getElementById('uptime'),
};

async function init() {
  await loadConfig();
  await loadHistory();
  wireEvents();
  setInterval(pollStatus, 1000);

  if (!config.api_key) {
    openPanel();
  }
}

async function loadConfig() {
  const resp = await fetch('/api/config');
  config = await resp.json();
  el.apiKey.value = config.api_key;
  el.model.value = config.model;
  el.apiEndpoint.value = config.api_endpoint;
  setStatus(config.api_key ? 'ONLINE' : 'STANDBY');
}

async function loadHistory() {
  const resp = await fetch('/api/history');
  const data = await resp.json();
  data.turns.forEach(turn => appendMessage(turn.role, turn.content, false));
}

function wireEvents() {
  el.send.addEventListener('click', sendMessage);
  el.input.addEventListener('keypress', e => {
    if (e.key === 'Enter' && !e.shiftKey) {
      e.preventDefault();
      sendMessage();
    }
  });

  el.settingsToggle.addEventListener('click', openPanel);
  el.configClose.addEventListener('click', closePanel);
  el.configSave.addEventListener('click', saveConfig);
  el.purge.addEventListener('click', purgeHistory);

  document.addEventListener('keydown', e => {
    if (e.key === 'Escape' && el.panel.classList.contains('active')) {
      closePanel();
    }
  });
}

async function sendMessage() {
  if (isProcessing) return;

  const message = el.input.value.trim();
  if (!message) return;

  if (!config.api_key) {
    showSystemMessage('Please configure your API key first', 'error');
    openPanel();
    return;
  }

  el.input.value = '';
  appendMessage('user', message);
  setProcessing(true);
  const typing = showTypingIndicator();

  try {
    const resp = await fetch('/api/chat', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ message }),
    });
    const data = await resp.json();
    typing.remove();

    if (data.outcome === 'reply') {
      appendMessage('assistant', data.content);
      el.latency.textContent = `${data.latency_ms}ms`;
      el.tokens.textContent = data.session_tokens;
    } else if (data.outcome === 'error') {
      showSystemMessage(`Error: ${data.message}`, 'error');
    } else if (data.outcome === 'missing_api_key') {
      showSystemMessage(data.message, 'error');
      openPanel();
    }
  } catch (err) {
    typing.remove();
    showSystemMessage(`Error: ${err.message}`, 'error');
  } finally {
    setProcessing(false);
  }
}

async function saveConfig() {
  const candidate = {
    api_key: el.apiKey.value.trim(),
    model: el.model.value.trim(),
    api_endpoint: el.apiEndpoint.value.trim(),
  };

  const resp = await fetch('/api/config', {
    method: 'PUT',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(candidate),
  });
  const data = await resp.json();

  if (data.success) {
    await loadConfig();
    closePanel();
    showSystemMessage('Configuration saved successfully', 'success');
  } else {
    showSystemMessage(data.error, 'error');
  }
}

async function purgeHistory() {
  await fetch('/api/history', { method: 'DELETE' });
  el.messages.innerHTML = '';
  showSystemMessage('Conversation cleared', 'success');
}

async function pollStatus() {
  if (isProcessing || polling) return;
  polling = true;
  try {
    const resp = await fetch('/api/status');
    const data = await resp.json();
    el.uptime.textContent = data.uptime;
    el.tokens.textContent = data.total_tokens;
    if (data.latency_ms !== null) {
      el.latency.textContent = `${data.latency_ms}ms`;
    }
    setStatus(data.status);
  } catch (err) {
    // Server unreachable; leave the display as-is.
  } finally {
    polling = false;
  }
}

function appendMessage(role, content, scroll = true) {
  const node = document.createElement('div');
  node.className = `message ${role}`;

  const avatar = document.createElement('div');
  avatar.className = 'message-avatar';
  avatar.textContent = role === 'user' ? 'U' : 'AI';

  const body = document.createElement('div');
  body.className = 'message-content';
  body.textContent = content;

  node.appendChild(avatar);
  node.appendChild(body);
  el.messages.appendChild(node);

  if (scroll) {
    node.scrollIntoView({ behavior: 'smooth', block: 'end' });
  }
}

function showSystemMessage(message, kind = 'info') {
  const node = document.createElement('div');
  node.className = `message ${kind}`;

  const avatar = document.createElement('div');
  avatar.className = 'message-avatar';
  avatar.textContent = '!';

  const body = document.createElement('div');
  body.className = 'message-content';
  body.textContent = message;

  node.appendChild(avatar);
  node.appendChild(body);
  el.messages.appendChild(node);
  node.scrollIntoView({ behavior: 'smooth', block: 'end' });
}

function showTypingIndicator() {
  const node = document.createElement('div');
  node.className = 'message assistant';

  const avatar = document.createElement('div');
  avatar.className = 'message-avatar';
  avatar.textContent = 'AI';

  const dots = document.createElement('div');
  dots.className = 'typing-indicator';
  dots.innerHTML = '<div class="typing-dot"></div><div class="typing-dot"></div><div class="typing-dot"></div>';

  node.appendChild(avatar);
  node.appendChild(dots);
  el.messages.appendChild(node);
  node.scrollIntoView({ behavior: 'smooth', block: 'end' });

  return node;
}

function setProcessing(processing) {
  isProcessing = processing;
  el.send.disabled = processing;
  el.input.disabled = processing;

  if (processing) {
    setStatus('PROCESSING');
  } else {
    setStatus(config.api_key ? 'ONLINE' : 'STANDBY');
    el.input.focus();
  }
}

function setStatus(status) {
  el.statusText.textContent = status;
  el.statusDot.className = 'status-dot';
  if (status === 'ONLINE') {
    el.statusDot.classList.add('online');
  } else if (status === 'PROCESSING') {
    el.statusDot.classList.add('processing');
  }
}

init();
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frontend_contains_core_elements() {
        assert!(INDEX_HTML.contains("id=\"messageInput\""));
        assert!(INDEX_HTML.contains("id=\"configPanel\""));
        assert!(INDEX_HTML.contains("/api/chat"));
        assert!(INDEX_HTML.contains("/api/status"));
        assert!(INDEX_HTML.contains("STANDBY"));
    }
}
