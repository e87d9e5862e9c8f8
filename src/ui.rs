use crate::models::MoodCategory;

pub fn render_index() -> String {
    INDEX_HTML.replace("{{MOOD_OPTIONS}}", &mood_options())
}

fn mood_options() -> String {
    MoodCategory::KNOWN
        .iter()
        .map(|mood| {
            format!(
                r#"<button class="mood-option" type="button" data-mood="{}"><span class="emoji">{}</span><span class="mood-label">{}</span></button>"#,
                mood.as_str(),
                mood.emoji(),
                mood.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n          ")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood Do Dia</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef2ff;
      --bg-2: #e9d5ff;
      --ink: #2b2a33;
      --accent: #7c3aed;
      --accent-2: #4c1d95;
      --card: rgba(255, 255, 255, 0.88);
      --shadow: 0 24px 60px rgba(76, 29, 149, 0.16);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(180deg, var(--bg-1), #f5f3ff 60%, #faf5ff 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(560px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
      animation: rise 600ms ease;
    }

    [hidden] {
      display: none !important;
    }

    header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(1.6rem, 4vw, 2.2rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 4px 0 0;
      color: #5f5c67;
      font-size: 0.95rem;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 14px 20px;
      font-size: 1rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button:disabled {
      opacity: 0.5;
      cursor: not-allowed;
    }

    .btn-primary {
      width: 100%;
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(124, 58, 237, 0.3);
    }

    .btn-ghost {
      background: transparent;
      color: var(--accent-2);
      padding: 8px 14px;
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(76, 29, 149, 0.08);
      border-radius: 999px;
    }

    .tab {
      flex: 1;
      background: transparent;
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      color: #6b6475;
      box-shadow: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(76, 29, 149, 0.12);
    }

    .field {
      display: grid;
      gap: 6px;
    }

    .field label {
      font-size: 0.9rem;
      font-weight: 500;
    }

    input, textarea {
      font: inherit;
      border-radius: 14px;
      border: 1px solid rgba(76, 29, 149, 0.18);
      padding: 12px 14px;
      background: white;
    }

    textarea {
      resize: none;
    }

    .form {
      display: grid;
      gap: 16px;
    }

    .moods {
      display: grid;
      grid-template-columns: repeat(5, 1fr);
      gap: 8px;
    }

    .mood-option {
      background: white;
      border-radius: 18px;
      border: 1px solid rgba(76, 29, 149, 0.08);
      padding: 14px 6px;
      display: grid;
      gap: 6px;
      justify-items: center;
      color: var(--ink);
    }

    .mood-option.selected {
      background: #f3e8ff;
      box-shadow: 0 0 0 2px #c4b5fd;
    }

    .mood-option .emoji {
      font-size: 1.8rem;
    }

    .mood-option .mood-label {
      font-size: 0.75rem;
    }

    .history {
      display: grid;
      gap: 12px;
      margin: 0;
      padding: 0;
      list-style: none;
    }

    .history li {
      background: white;
      border-radius: 18px;
      padding: 14px 16px;
      border: 1px solid rgba(76, 29, 149, 0.08);
      display: grid;
      gap: 4px;
    }

    .history li.pending {
      opacity: 0.6;
    }

    .history .row {
      display: flex;
      align-items: center;
      gap: 10px;
      font-weight: 600;
    }

    .history .when {
      font-size: 0.85rem;
      color: #7a7484;
    }

    .history .note {
      margin: 0;
      font-size: 0.95rem;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(76, 29, 149, 0.08);
      display: grid;
      gap: 10px;
    }

    .chart {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 3;
    }

    .chart-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-bar {
      fill: var(--accent);
      opacity: 0.85;
    }

    .chart-grid {
      stroke: rgba(76, 29, 149, 0.12);
    }

    .chart-label {
      fill: #7a7484;
      font-size: 11px;
    }

    .empty {
      text-align: center;
      color: #7a7484;
      padding: 24px 0;
      margin: 0;
    }

    .spinner {
      width: 40px;
      height: 40px;
      margin: 24px auto;
      border-radius: 50%;
      border: 3px solid rgba(124, 58, 237, 0.15);
      border-bottom-color: var(--accent);
      animation: spin 900ms linear infinite;
    }

    .toasts {
      position: fixed;
      right: 18px;
      bottom: 18px;
      display: grid;
      gap: 10px;
      width: min(360px, calc(100% - 36px));
    }

    .toast {
      background: white;
      border-radius: 16px;
      padding: 12px 16px;
      box-shadow: var(--shadow);
      border-left: 4px solid var(--accent);
    }

    .toast.destructive {
      border-left-color: #c63b2b;
    }

    .toast strong {
      display: block;
      margin-bottom: 2px;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }

    @media (max-width: 600px) {
      .app {
        padding: 26px 18px;
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <div id="booting" class="spinner"></div>

    <section id="auth-view" hidden>
      <header>
        <div>
          <h1>Mood Do Dia</h1>
          <p class="subtitle">Acompanhe suas emoções e monitore seu bem-estar mental</p>
        </div>
      </header>
      <div class="tabs" role="tablist">
        <button class="tab active" type="button" data-auth-tab="sign-in" role="tab">Entrar</button>
        <button class="tab" type="button" data-auth-tab="sign-up" role="tab">Cadastrar</button>
      </div>
      <form id="auth-form" class="form" novalidate>
        <div class="field">
          <label for="email">Email</label>
          <input id="email" type="email" placeholder="seu@email.com" autocomplete="email" />
        </div>
        <div class="field">
          <label for="password">Senha</label>
          <input id="password" type="password" placeholder="Sua senha" autocomplete="current-password" />
        </div>
        <button id="auth-submit" class="btn-primary" type="submit">Entrar</button>
      </form>
    </section>

    <section id="dashboard-view" hidden>
      <header>
        <h1 id="greeting">Olá</h1>
        <button id="sign-out" class="btn-ghost" type="button" aria-label="Sair">Sair</button>
      </header>
      <div class="tabs" role="tablist">
        <button class="tab active" type="button" data-tab="entry" role="tab">Hoje</button>
        <button class="tab" type="button" data-tab="history" role="tab">Histórico</button>
        <button class="tab" type="button" data-tab="charts" role="tab">Gráficos</button>
      </div>

      <div data-panel="entry" class="form">
        <div>
          <h2>Como você está se sentindo hoje?</h2>
          <p class="subtitle">Selecione uma emoção que melhor descreva seu humor</p>
        </div>
        <div class="moods">
          {{MOOD_OPTIONS}}
        </div>
        <div class="field">
          <label for="note">Adicione uma nota (opcional)</label>
          <textarea id="note" rows="4" placeholder="Como você está se sentindo hoje? O que aconteceu?"></textarea>
        </div>
        <button id="save" class="btn-primary" type="button" disabled>Salvar Humor</button>
      </div>

      <div data-panel="history" class="form" hidden>
        <div>
          <h2>Seu Histórico de Humor</h2>
          <p class="subtitle">Revise seus registros de humor anteriores</p>
        </div>
        <div id="history"></div>
      </div>

      <div data-panel="charts" class="form" hidden>
        <div>
          <h2>Tendências de Humor</h2>
          <p class="subtitle">Visualize seus padrões emocionais ao longo do tempo</p>
        </div>
        <div class="tabs" role="tablist">
          <button class="tab active" type="button" data-window="7days" role="tab">Últimos 7 Dias</button>
          <button class="tab" type="button" data-window="30days" role="tab">Últimos 30 Dias</button>
        </div>
        <div id="charts"></div>
      </div>
    </section>
  </main>

  <div class="toasts" id="toasts"></div>

  <script>
    const $ = (id) => document.getElementById(id);
    const bootingEl = $('booting');
    const authView = $('auth-view');
    const dashboardView = $('dashboard-view');
    const authForm = $('auth-form');
    const authSubmit = $('auth-submit');
    const emailEl = $('email');
    const passwordEl = $('password');
    const noteEl = $('note');
    const saveBtn = $('save');
    const historyEl = $('history');
    const chartsEl = $('charts');
    const toastsEl = $('toasts');

    let authMode = 'sign-in';
    let selectedMood = null;
    let activeTab = 'entry';
    let trendWindow = '7days';

    const el = (tag, attrs = {}, children = []) => {
      const node = document.createElement(tag);
      for (const [key, value] of Object.entries(attrs)) {
        if (key === 'text') {
          node.textContent = value;
        } else {
          node.setAttribute(key, value);
        }
      }
      children.forEach((child) => node.appendChild(child));
      return node;
    };

    const api = async (path, options = {}) => {
      const res = await fetch(path, {
        headers: { 'content-type': 'application/json' },
        ...options
      });
      pullToasts();
      return res;
    };

    const pullToasts = async () => {
      const res = await fetch('/api/toasts');
      if (!res.ok) {
        return;
      }
      const items = await res.json();
      items.forEach((toast) => {
        const node = el('div', { class: `toast ${toast.variant}` }, [
          el('strong', { text: toast.title }),
          el('span', { text: toast.description })
        ]);
        toastsEl.appendChild(node);
        setTimeout(() => node.remove(), 3500);
      });
    };

    const sleep = (ms) => new Promise((resolve) => setTimeout(resolve, ms));

    const renderSession = (session) => {
      bootingEl.hidden = session.state !== 'unknown';
      authView.hidden = session.state !== 'anonymous' && session.state !== 'authenticating';
      dashboardView.hidden = session.state !== 'authenticated';
      authSubmit.disabled = session.state === 'authenticating';
      if (session.user) {
        $('greeting').textContent = `Olá, ${session.user.display_name}`;
      }
    };

    // Session changes arrive asynchronously after sign-in/out; poll until it settles.
    const refreshSession = async (expectChangeFrom) => {
      for (let attempt = 0; attempt < 30; attempt += 1) {
        const res = await fetch('/api/session');
        const session = await res.json();
        renderSession(session);
        const settled = session.state !== 'unknown' && session.state !== 'authenticating';
        if (settled && session.state !== expectChangeFrom && !session.loading) {
          if (session.state === 'authenticated') {
            refreshData();
          }
          return session;
        }
        await sleep(150);
      }
      return null;
    };

    const refreshData = () => {
      loadHistory().catch(() => {});
      loadTrends().catch(() => {});
    };

    document.querySelectorAll('[data-auth-tab]').forEach((button) => {
      button.addEventListener('click', () => {
        authMode = button.dataset.authTab;
        document.querySelectorAll('[data-auth-tab]').forEach((other) => {
          other.classList.toggle('active', other === button);
        });
        authSubmit.textContent = authMode === 'sign-in' ? 'Entrar' : 'Criar Conta';
        passwordEl.placeholder = authMode === 'sign-in' ? 'Sua senha' : 'Mínimo de 6 caracteres';
      });
    });

    authForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      authSubmit.disabled = true;
      const res = await api(`/api/auth/${authMode}`, {
        method: 'POST',
        body: JSON.stringify({ email: emailEl.value, password: passwordEl.value })
      });
      if (res.ok) {
        passwordEl.value = '';
        await refreshSession('anonymous');
      }
      authSubmit.disabled = false;
    });

    $('sign-out').addEventListener('click', async () => {
      const res = await api('/api/auth/sign-out', { method: 'POST' });
      if (res.ok) {
        await refreshSession('authenticated');
      }
    });

    document.querySelectorAll('[data-tab]').forEach((button) => {
      button.addEventListener('click', () => {
        activeTab = button.dataset.tab;
        document.querySelectorAll('[data-tab]').forEach((other) => {
          other.classList.toggle('active', other === button);
        });
        document.querySelectorAll('[data-panel]').forEach((panel) => {
          panel.hidden = panel.dataset.panel !== activeTab;
        });
        refreshData();
      });
    });

    document.querySelectorAll('[data-window]').forEach((button) => {
      button.addEventListener('click', () => {
        trendWindow = button.dataset.window;
        document.querySelectorAll('[data-window]').forEach((other) => {
          other.classList.toggle('active', other === button);
        });
        loadTrends().catch(() => {});
      });
    });

    document.querySelectorAll('.mood-option').forEach((button) => {
      button.addEventListener('click', () => {
        selectedMood = button.dataset.mood;
        document.querySelectorAll('.mood-option').forEach((other) => {
          other.classList.toggle('selected', other === button);
        });
        saveBtn.disabled = false;
      });
    });

    const resetEntry = () => {
      selectedMood = null;
      noteEl.value = '';
      saveBtn.disabled = true;
      document.querySelectorAll('.mood-option').forEach((other) => other.classList.remove('selected'));
    };

    saveBtn.addEventListener('click', async () => {
      if (!selectedMood) {
        return;
      }
      const payload = { mood: selectedMood, note: noteEl.value };
      resetEntry();
      await api('/api/moods', { method: 'POST', body: JSON.stringify(payload) });
      refreshData();
      // The remote write settles in the background; pick up its outcome.
      setTimeout(refreshData, 800);
      setTimeout(pullToasts, 800);
    });

    const loadHistory = async () => {
      const res = await fetch('/api/moods');
      if (!res.ok) {
        return;
      }
      const data = await res.json();
      historyEl.replaceChildren();
      if (data.loading) {
        historyEl.appendChild(el('div', { class: 'spinner' }));
        return;
      }
      if (!data.entries.length) {
        historyEl.appendChild(el('p', { class: 'empty', text: 'Nenhum registro de humor ainda. Comece a acompanhar seu humor hoje!' }));
        return;
      }
      const list = el('ul', { class: 'history' });
      data.entries.forEach((entry) => {
        const children = [
          el('div', { class: 'row' }, [
            el('span', { text: entry.emoji }),
            el('span', { text: entry.label })
          ]),
          el('div', { class: 'when', text: entry.display })
        ];
        if (entry.note) {
          children.push(el('p', { class: 'note', text: entry.note }));
        }
        list.appendChild(el('li', { class: entry.pending ? 'pending' : '' }, children));
      });
      historyEl.appendChild(list);
    };

    const svg = (tag, attrs = {}) => {
      const node = document.createElementNS('http://www.w3.org/2000/svg', tag);
      for (const [key, value] of Object.entries(attrs)) {
        if (key === 'text') {
          node.textContent = value;
        } else {
          node.setAttribute(key, value);
        }
      }
      return node;
    };

    const chartFrame = (max, ticks) => {
      const width = 520;
      const height = 240;
      const paddingX = 36;
      const paddingY = 34;
      const top = 16;
      const root = svg('svg', { class: 'chart', viewBox: `0 0 ${width} ${height}` });
      const scaleY = (height - top - paddingY) / max;
      const y = (value) => height - paddingY - value * scaleY;
      ticks.forEach((value) => {
        root.appendChild(svg('line', { class: 'chart-grid', x1: paddingX, y1: y(value), x2: width - paddingX, y2: y(value) }));
        root.appendChild(svg('text', { class: 'chart-label', x: paddingX - 8, y: y(value) + 4, 'text-anchor': 'end', text: String(value) }));
      });
      return { root, width, height, paddingX, paddingY, y };
    };

    const renderLineChart = (points) => {
      const frame = chartFrame(5, [0, 1, 2, 3, 4, 5]);
      const xStep = points.length > 1 ? (frame.width - frame.paddingX * 2) / (points.length - 1) : 0;
      const x = (index) => frame.paddingX + index * xStep;
      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${frame.y(point.value).toFixed(2)}`)
        .join(' ');
      frame.root.appendChild(svg('path', { class: 'chart-line', d: path }));
      const labelEvery = points.length > 8 ? Math.ceil(points.length / 8) : 1;
      points.forEach((point, index) => {
        const circle = svg('circle', { class: 'chart-point', cx: x(index), cy: frame.y(point.value), r: 4 });
        circle.appendChild(svg('title', { text: `${point.date}: ${point.mood_label}${point.note ? ` - ${point.note}` : ''}` }));
        frame.root.appendChild(circle);
        if (index % labelEvery === 0) {
          frame.root.appendChild(svg('text', { class: 'chart-label', x: x(index), y: frame.height - frame.paddingY + 18, 'text-anchor': 'middle', text: point.date }));
        }
      });
      return frame.root;
    };

    const renderBarChart = (buckets) => {
      const max = Math.max(1, ...buckets.map((bucket) => bucket.count));
      const frame = chartFrame(max, [0, Math.ceil(max / 2), max]);
      const slot = (frame.width - frame.paddingX * 2) / buckets.length;
      buckets.forEach((bucket, index) => {
        const center = frame.paddingX + slot * index + slot / 2;
        const top = frame.y(bucket.count);
        frame.root.appendChild(svg('rect', { class: 'chart-bar', x: center - slot * 0.3, y: top, width: slot * 0.6, height: frame.y(0) - top, rx: 6 }));
        frame.root.appendChild(svg('text', { class: 'chart-label', x: center, y: frame.height - frame.paddingY + 18, 'text-anchor': 'middle', text: bucket.label }));
      });
      return frame.root;
    };

    const loadTrends = async () => {
      const res = await fetch(`/api/trends?window=${trendWindow}`);
      if (!res.ok) {
        return;
      }
      const report = await res.json();
      chartsEl.replaceChildren();
      if (!report.distribution.length) {
        chartsEl.appendChild(el('p', { class: 'empty', text: 'Nenhum dado de humor disponível ainda. Comece a registrar seu humor para ver os gráficos!' }));
        return;
      }
      const lineCard = el('div', { class: 'chart-card' }, [el('h2', { text: 'Nível de Humor' })]);
      if (report.series.length) {
        lineCard.appendChild(renderLineChart(report.series));
      } else {
        lineCard.appendChild(el('p', { class: 'empty', text: 'Nenhum dado disponível para o período selecionado' }));
      }
      const barCard = el('div', { class: 'chart-card' }, [
        el('h2', { text: 'Distribuição de Humor' }),
        renderBarChart(report.distribution)
      ]);
      chartsEl.appendChild(lineCard);
      chartsEl.appendChild(barCard);
    };

    refreshSession(null).catch(() => {});
  </script>
</body>
</html>
"#;
